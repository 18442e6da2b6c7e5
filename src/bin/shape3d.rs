use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use shape3d_engine::{Engine, EngineConfig, EngineError, EngineResult, InputKind, Request};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    match run() {
        Ok(()) => {}
        Err(EngineError::InvalidChoice(answer)) => {
            log::debug!("rejected choice {answer:?}");
            println!("Invalid choice. Please type 'text' or 'image'.");
            std::process::exit(1);
        }
        Err(err) => {
            eprintln!("shape3d error: {err}");
            std::process::exit(1);
        }
    }
}

const CHOICE_PROMPT: &str = "Would you like to input a 'text' or an 'image'?\n";
const TEXT_PROMPT: &str = "Enter a brief description (e.g., 'a cone'): \n";
const IMAGE_PROMPT: &str = "Enter the image file path (e.g., 'picture.jpg'): \n";

fn run() -> EngineResult<()> {
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut output = io::stdout();

    println!("Welcome to the 3D Model Generator!");
    let choice = prompt(&mut input, &mut output, CHOICE_PROMPT)?;
    let request = match InputKind::parse(&choice)? {
        InputKind::Text => Request::Text(prompt(&mut input, &mut output, TEXT_PROMPT)?),
        InputKind::Image => {
            Request::Image(PathBuf::from(prompt(&mut input, &mut output, IMAGE_PROMPT)?))
        }
    };

    let engine = Engine::with_config(EngineConfig::interactive());
    let report = engine.run(&request)?;
    log::debug!("run finished: {report:?}");
    Ok(())
}

/// Writes `message` as is and reads one line, without its line terminator.
fn prompt(input: &mut impl BufRead, output: &mut impl Write, message: &str) -> io::Result<String> {
    output.write_all(message.as_bytes())?;
    output.flush()?;

    let mut line = String::new();
    input.read_line(&mut line)?;
    if line.ends_with('\n') {
        line.pop();
        if line.ends_with('\r') {
            line.pop();
        }
    }
    Ok(line)
}
