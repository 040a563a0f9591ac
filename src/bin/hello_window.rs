use learngl::lessons::HelloWindow;
use std::process::ExitCode;

fn main() -> ExitCode {
    learngl::app::launch::<HelloWindow>()
}
