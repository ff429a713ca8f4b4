// udpcfg : interface en ligne de commande pour le démon de configuration udp_cfgd.
//
//   udpcfg [--config PATH] [--timeout MS] [--json] <host[:port]> get
//   udpcfg [--config PATH] [--timeout MS] [--json] <host[:port]> set <w> <h> <bitrate> <fps>
//   udpcfg [--config PATH]            (mode interactif)

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use serde::Serialize;

use udp_cfg_client::client::{DeviceClient, Endpoint};
use udp_cfg_client::error::{AppError, Result};
use udp_cfg_client::init::init_logging_and_env;
use udp_cfg_client::protocol::{Command, PacketParser, Response, StreamSettings};
use udp_cfg_client::read_config::{read_client_config, ClientConfig};

#[derive(Debug, Default)]
struct Args {
    config: Option<PathBuf>,
    timeout_ms: Option<u64>,
    json: bool,
    positional: Vec<String>,
}

#[derive(Serialize)]
struct Outcome<'a> {
    endpoint: String,
    command: &'a str,
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    values: Option<StreamSettings>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

fn usage() {
    println!("Utilisation :");
    println!("  udpcfg [--config PATH] [--timeout MS] [--json] <host[:port]> get");
    println!("  udpcfg [--config PATH] [--timeout MS] [--json] <host[:port]> set <width> <height> <bitrate> <fps>");
    println!("  udpcfg [--config PATH]                 mode interactif");
}

fn help() {
    println!("Commandes disponibles:");
    println!("  set <width> <height> <bitrate> <fps>  - Applique les paramètres du flux (SET)");
    println!("  get                                   - Lit les paramètres actuels (GET)");
    println!("  help                                  - Affiche cette aide");
    println!("  exit                                  - Quitte le CLI");
}

fn parse_args(raw: impl Iterator<Item = String>) -> Result<Args> {
    let mut args = Args::default();
    let mut raw = raw;
    while let Some(arg) = raw.next() {
        match arg.as_str() {
            "--config" | "-c" => {
                let path = raw
                    .next()
                    .ok_or_else(|| AppError::InvalidCommand("--config needs a path".to_string()))?;
                args.config = Some(PathBuf::from(path));
            }
            "--timeout" | "-t" => {
                let ms = raw
                    .next()
                    .ok_or_else(|| AppError::InvalidCommand("--timeout needs milliseconds".to_string()))?;
                args.timeout_ms = Some(
                    ms.parse()
                        .map_err(|_| AppError::InvalidCommand(format!("invalid timeout {:?}", ms)))?,
                );
            }
            "--json" => args.json = true,
            _ => args.positional.push(arg),
        }
    }
    Ok(args)
}

fn parse_u32(field: &str, token: &str) -> Result<u32> {
    token
        .parse()
        .map_err(|_| AppError::InvalidCommand(format!("{} must be a positive integer, got {:?}", field, token)))
}

/// Turns `get` / `set w h b f` words into a validated command.
fn parse_command(words: &[&str]) -> Result<Command> {
    match words {
        [cmd] if cmd.eq_ignore_ascii_case("get") => Ok(Command::Get),
        [cmd, w, h, b, f] if cmd.eq_ignore_ascii_case("set") => Command::set(StreamSettings::new(
            parse_u32("width", w)?,
            parse_u32("height", h)?,
            parse_u32("bitrate", b)?,
            parse_u32("fps", f)?,
        )),
        [cmd, ..] if cmd.eq_ignore_ascii_case("set") => Err(AppError::InvalidCommand(
            "set takes exactly four values: <width> <height> <bitrate> <fps>".to_string(),
        )),
        [cmd, ..] => Err(AppError::InvalidCommand(format!("unknown command {:?}", cmd))),
        [] => Err(AppError::InvalidCommand("missing command".to_string())),
    }
}

/// Runs one exchange and prints it as communication log lines.
async fn exchange(client: &DeviceClient, command: &Command, json: bool) -> bool {
    let line = PacketParser::command_line(command);
    if !json {
        println!(">>> {} envoi: {}", client.endpoint(), line.trim_end());
    }

    let result = client.send(command).await;
    let outcome = |ok, values, error| Outcome {
        endpoint: client.endpoint().to_string(),
        command: command.name(),
        ok,
        values,
        error,
    };

    match result {
        Ok(response) => {
            let ok = response.is_ok();
            if json {
                let report = match &response {
                    Response::Ok(values) => outcome(true, *values, None),
                    Response::Err(reason) => {
                        outcome(false, None, Some(AppError::DeviceError(reason.clone()).to_string()))
                    }
                };
                print_json(&report);
            } else {
                println!("<<< reçu: {}", response);
                if let Response::Ok(Some(values)) = &response {
                    println!("    {}", values);
                }
            }
            ok
        }
        Err(e) => {
            if json {
                print_json(&outcome(false, None, Some(e.to_string())));
            } else {
                println!("!!! erreur: {}", e);
            }
            false
        }
    }
}

fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string(value) {
        Ok(text) => println!("{}", text),
        Err(e) => eprintln!("Échec de l'encodage JSON: {}", e),
    }
}

fn prompt(label: &str, default: &str) -> io::Result<String> {
    print!("{} [{}]: ", label, default);
    io::stdout().flush()?;
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    let input = input.trim();
    Ok(if input.is_empty() { default.to_string() } else { input.to_string() })
}

async fn interactive(config: &ClientConfig, timeout: Duration, json: bool) -> Result<bool> {
    let host = prompt("Entrez l'adresse IP de l'appareil", &config.host)?;
    let port = prompt("Entrez le port UDP de l'appareil", &config.port.to_string())?;
    let port: u16 = port
        .parse()
        .map_err(|_| AppError::ConfigError(format!("invalid port {:?}", port)))?;
    let client = DeviceClient::new(Endpoint::new(host, port)?, timeout)?;

    println!("\nAppareil cible: {} (timeout {}ms)", client.endpoint(), timeout.as_millis());
    help();

    let mut last_ok = true;
    loop {
        print!("\n> ");
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            break;
        }
        let words: Vec<&str> = input.split_whitespace().collect();
        match words.as_slice() {
            [] => continue,
            ["exit"] | ["quit"] => break,
            ["help"] => {
                help();
                continue;
            }
            _ => {}
        }

        match parse_command(&words) {
            Ok(command) => last_ok = exchange(&client, &command, json).await,
            Err(e) => {
                println!("!!! erreur: {}", e);
                last_ok = false;
            }
        }
    }
    Ok(last_ok)
}

async fn run(args: Args) -> Result<bool> {
    let config = read_client_config(args.config.as_deref())?;
    let timeout = Duration::from_millis(args.timeout_ms.unwrap_or(config.timeout_ms));

    if args.positional.is_empty() {
        return interactive(&config, timeout, args.json).await;
    }

    let endpoint: Endpoint = args.positional[0].parse()?;
    let words: Vec<&str> = args.positional[1..].iter().map(String::as_str).collect();
    let command = parse_command(&words)?;
    let client = DeviceClient::new(endpoint, timeout)?;
    Ok(exchange(&client, &command, args.json).await)
}

fn main() -> ExitCode {
    init_logging_and_env("warn");

    let args = match parse_args(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("{}", e);
            usage();
            return ExitCode::FAILURE;
        }
    };
    if args.positional.first().map(String::as_str) == Some("--help")
        || args.positional.first().map(String::as_str) == Some("-h")
    {
        usage();
        return ExitCode::SUCCESS;
    }

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Échec du démarrage du runtime: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(args)) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("!!! erreur: {}", e);
            if matches!(e, AppError::InvalidCommand(_)) {
                usage();
            }
            ExitCode::FAILURE
        }
    }
}
