use learngl::lessons::Textures;
use std::process::ExitCode;

fn main() -> ExitCode {
    learngl::app::launch::<Textures>()
}
