/// Entry point for the application.
///
/// Runs the tour until the window is closed. Any setup or asset failure is logged and ends the
/// process with status -1.
fn main() {
    if let Err(error) = pollster::block_on(tour::run(None)) {
        log::error!("{}", error);
        std::process::exit(error.exit_code());
    }
}
