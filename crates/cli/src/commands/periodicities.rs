use cotizador_core::Periodicity;

use crate::commands::CommandResult;

pub fn run() -> CommandResult {
    CommandResult::payload("periodicities", &Periodicity::options())
}
