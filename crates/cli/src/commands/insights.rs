use crate::commands::{
    build_engine, build_runtime, load_config, parse_weight_overrides, to_pretty_json,
    CommandFailure, CommandResult,
};

pub fn run(period_days: Option<u32>, weight_args: &[String]) -> CommandResult {
    let config = match load_config("insights") {
        Ok(config) => config,
        Err(failure) => return failure,
    };
    let overrides = match parse_weight_overrides(weight_args) {
        Ok(overrides) => overrides,
        Err(message) => {
            return CommandResult::failure("insights", "invalid_argument", message, 2);
        }
    };
    let runtime = match build_runtime("insights") {
        Ok(runtime) => runtime,
        Err(failure) => return failure,
    };

    let period_days = period_days.unwrap_or(config.engine.period_days);
    let result = runtime.block_on(async {
        let (pool, engine) = build_engine(&config).await?;
        let insights = engine
            .build_insights(period_days, Some(&overrides))
            .await
            .map_err(|error| ("engine", error.to_string(), 6u8))?;
        pool.close().await;
        Ok::<_, CommandFailure>(insights)
    });

    match result {
        Ok(insights) => match to_pretty_json("insights", &insights) {
            Ok(output) => CommandResult { exit_code: 0, output },
            Err(failure) => failure,
        },
        Err((error_class, message, exit_code)) => {
            CommandResult::failure("insights", error_class, message, exit_code)
        }
    }
}
