use crate::commands::{build_runtime, load_config, CommandFailure, CommandResult};
use venuefit_db::{connect, demo_snapshot, migrations, SqlDataStore};

pub fn run() -> CommandResult {
    let config = match load_config("seed") {
        Ok(config) => config,
        Err(failure) => return failure,
    };
    let runtime = match build_runtime("seed") {
        Ok(runtime) => runtime,
        Err(failure) => return failure,
    };

    let result = runtime.block_on(async {
        let pool = connect(&config.database)
            .await
            .map_err(|error| ("db_connectivity", error.to_string(), 4u8))?;

        migrations::run_pending(&pool)
            .await
            .map_err(|error| ("migration", error.to_string(), 5u8))?;

        let store = SqlDataStore::new(pool.clone());
        let counts = store
            .import_snapshot(&demo_snapshot())
            .await
            .map_err(|error| ("seed_execution", error.to_string(), 6u8))?;

        pool.close().await;
        Ok::<_, CommandFailure>(counts)
    });

    match result {
        Ok(counts) => CommandResult::success(
            "seed",
            format!(
                "seeded demo data: {} clients, {} venues, {} shifts, {} outfits, {} transactions",
                counts.clients, counts.venues, counts.shifts, counts.outfits, counts.transactions
            ),
        ),
        Err((error_class, message, exit_code)) => {
            CommandResult::failure("seed", error_class, message, exit_code)
        }
    }
}
