use crate::commands::{build_engine, build_runtime, load_config, CommandFailure, CommandResult};
use venuefit_core::insights::QueryOptions;

pub fn run(question: &str, period_days: Option<u32>) -> CommandResult {
    let config = match load_config("ask") {
        Ok(config) => config,
        Err(failure) => return failure,
    };
    let runtime = match build_runtime("ask") {
        Ok(runtime) => runtime,
        Err(failure) => return failure,
    };

    let options = QueryOptions { period_days: period_days.or(Some(config.engine.period_days)) };
    let result = runtime.block_on(async {
        let (pool, engine) = build_engine(&config).await?;
        let answer = engine
            .answer_query(question, options)
            .await
            .map_err(|error| ("engine", error.to_string(), 6u8))?;
        pool.close().await;
        Ok::<_, CommandFailure>(answer)
    });

    match result {
        Ok(answer) => CommandResult::success("ask", answer),
        Err((error_class, message, exit_code)) => {
            CommandResult::failure("ask", error_class, message, exit_code)
        }
    }
}
