use crate::commands::{
    build_engine, build_runtime, load_config, to_pretty_json, CommandFailure, CommandResult,
};

pub fn run(period_days: Option<u32>, weeks: Option<u32>) -> CommandResult {
    let config = match load_config("schedule") {
        Ok(config) => config,
        Err(failure) => return failure,
    };
    let runtime = match build_runtime("schedule") {
        Ok(runtime) => runtime,
        Err(failure) => return failure,
    };

    let period_days = period_days.unwrap_or(config.engine.period_days);
    let weeks = weeks.unwrap_or(config.engine.schedule_weeks);
    let result = runtime.block_on(async {
        let (pool, engine) = build_engine(&config).await?;
        let suggestions = engine
            .generate_schedule_suggestions(period_days, weeks)
            .await
            .map_err(|error| ("engine", error.to_string(), 6u8))?;
        pool.close().await;
        Ok::<_, CommandFailure>(suggestions)
    });

    match result {
        Ok(suggestions) => match to_pretty_json("schedule", &suggestions) {
            Ok(output) => CommandResult { exit_code: 0, output },
            Err(failure) => failure,
        },
        Err((error_class, message, exit_code)) => {
            CommandResult::failure("schedule", error_class, message, exit_code)
        }
    }
}
