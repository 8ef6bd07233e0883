use crate::commands::{parse_weight_overrides, to_pretty_json, CommandResult};
use venuefit_core::insights::ScoringWeights;

/// Pure preview: shows the weights an engine would run with after the
/// given overrides. Nothing is persisted.
pub fn run(set_args: &[String]) -> CommandResult {
    let overrides = match parse_weight_overrides(set_args) {
        Ok(overrides) => overrides,
        Err(message) => {
            return CommandResult::failure("weights", "invalid_argument", message, 2);
        }
    };

    let effective = ScoringWeights::default().merged(&overrides);
    match to_pretty_json("weights", &effective) {
        Ok(output) => CommandResult { exit_code: 0, output },
        Err(failure) => failure,
    }
}
