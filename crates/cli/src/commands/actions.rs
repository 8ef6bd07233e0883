use crate::commands::{
    build_engine, build_runtime, load_config, to_pretty_json, CommandFailure, CommandResult,
};

pub fn run(period_days: Option<u32>) -> CommandResult {
    let config = match load_config("actions") {
        Ok(config) => config,
        Err(failure) => return failure,
    };
    let runtime = match build_runtime("actions") {
        Ok(runtime) => runtime,
        Err(failure) => return failure,
    };

    let period_days = period_days.unwrap_or(config.engine.period_days);
    let result = runtime.block_on(async {
        let (pool, engine) = build_engine(&config).await?;
        let actions = engine
            .generate_action_items(period_days)
            .await
            .map_err(|error| ("engine", error.to_string(), 6u8))?;
        pool.close().await;
        Ok::<_, CommandFailure>(actions)
    });

    match result {
        Ok(actions) => match to_pretty_json("actions", &actions) {
            Ok(output) => CommandResult { exit_code: 0, output },
            Err(failure) => failure,
        },
        Err((error_class, message, exit_code)) => {
            CommandResult::failure("actions", error_class, message, exit_code)
        }
    }
}
