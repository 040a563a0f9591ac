use learngl::lessons::UniformColor;
use std::process::ExitCode;

fn main() -> ExitCode {
    learngl::app::launch::<UniformColor>()
}
