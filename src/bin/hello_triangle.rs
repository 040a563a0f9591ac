use learngl::lessons::HelloTriangle;
use std::process::ExitCode;

fn main() -> ExitCode {
    learngl::app::launch::<HelloTriangle>()
}
