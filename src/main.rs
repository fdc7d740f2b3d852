use dynsuccinct::commands;
use dynsuccinct::config::Config;
use std::env;
use std::process;

fn main() {
    let args: Vec<String> = env::args().collect();

    let config = Config::new(&args).unwrap_or_else(|err| {
        eprintln!("problem parsing arguments: {err}");
        process::exit(1);
    });

    match commands::run(&config) {
        Ok(bytes) => println!("wrote {bytes} bytes to {}", config.file_out),
        Err(err) => {
            eprintln!("{err}");
            process::exit(1);
        }
    }
}
