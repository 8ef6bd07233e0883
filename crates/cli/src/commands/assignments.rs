use crate::commands::{
    build_engine, build_runtime, load_config, to_pretty_json, CommandFailure, CommandResult,
};

pub fn run(period_days: Option<u32>, top: Option<usize>) -> CommandResult {
    let config = match load_config("assignments") {
        Ok(config) => config,
        Err(failure) => return failure,
    };
    let runtime = match build_runtime("assignments") {
        Ok(runtime) => runtime,
        Err(failure) => return failure,
    };

    let period_days = period_days.unwrap_or(config.engine.period_days);
    let top = top.unwrap_or(config.engine.top_n);
    let result = runtime.block_on(async {
        let (pool, engine) = build_engine(&config).await?;
        let assignments = engine
            .generate_client_assignments(period_days, top)
            .await
            .map_err(|error| ("engine", error.to_string(), 6u8))?;
        pool.close().await;
        Ok::<_, CommandFailure>(assignments)
    });

    match result {
        Ok(assignments) => match to_pretty_json("assignments", &assignments) {
            Ok(output) => CommandResult { exit_code: 0, output },
            Err(failure) => failure,
        },
        Err((error_class, message, exit_code)) => {
            CommandResult::failure("assignments", error_class, message, exit_code)
        }
    }
}
