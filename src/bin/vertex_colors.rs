use learngl::lessons::VertexColors;
use std::process::ExitCode;

fn main() -> ExitCode {
    learngl::app::launch::<VertexColors>()
}
