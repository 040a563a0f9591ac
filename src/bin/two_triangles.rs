use learngl::lessons::TwoTriangles;
use std::process::ExitCode;

fn main() -> ExitCode {
    learngl::app::launch::<TwoTriangles>()
}
