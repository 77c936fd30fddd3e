use std::io::{self, Write};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let mut buffer = String::new();
    let mut stdout = io::stdout();
    let stdin = io::stdin();
    loop {
        stdout.write_all(">> ".as_bytes())?;
        stdout.flush()?;
        buffer.clear();
        if stdin.read_line(&mut buffer)? == 0 {
            // end of input
            return Ok(());
        }
        let line = buffer.trim();
        match line {
            "" => continue,
            "exit" | "quit" => return Ok(()),
            _ => match zipex::evaluate(line) {
                Ok(x) => println!("{x}"),
                Err(e) => eprintln!("Error {e}"),
            },
        }
    }
}
