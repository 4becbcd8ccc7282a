//tilelayers/src/main.rs
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::time::{Duration, Instant};

use tilelayers::app::{install_termination_signals, Workbench};
use tilelayers::kernel::services::adapters::{
    ensure_settings_file, load_settings, load_settings_from,
};
use tilelayers::kernel::{LayerNamesError, Settings, TilesetGeometry};
use tilelayers::models::Tileset;

mod logging;

const IDLE_POLL: Duration = Duration::from_millis(100);

const USAGE: &str = "\
usage: tilelayers [--settings=PATH] list  <image> <tile_w> <tile_h>
       tilelayers [--settings=PATH] get   <image> <tile_w> <tile_h> <id>
       tilelayers [--settings=PATH] set   <image> <tile_w> <tile_h> <id> <name>
       tilelayers [--settings=PATH] watch <image> <tile_w> <tile_h> [<image> <tile_w> <tile_h>]...";

#[derive(Debug, Clone, PartialEq, Eq)]
struct TilesetArg {
    image: PathBuf,
    tile_width: u32,
    tile_height: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    List(TilesetArg),
    Get(TilesetArg, usize),
    Set(TilesetArg, usize, String),
    Watch(Vec<TilesetArg>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Args {
    settings_path: Option<PathBuf>,
    command: Command,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ArgsError(String);

impl std::fmt::Display for ArgsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}\n\n{}", self.0, USAGE)
    }
}

impl std::error::Error for ArgsError {}

fn parse_args<I>(args: I) -> Result<Args, ArgsError>
where
    I: IntoIterator<Item = String>,
{
    let mut settings_path = None;
    let mut positional = Vec::new();
    for arg in args {
        if let Some(value) = arg.strip_prefix("--settings=") {
            if value.is_empty() {
                return Err(ArgsError("--settings needs a path".to_string()));
            }
            settings_path = Some(PathBuf::from(value));
        } else if arg.starts_with("--") {
            return Err(ArgsError(format!("unknown option `{arg}`")));
        } else {
            positional.push(arg);
        }
    }

    let Some((name, rest)) = positional.split_first() else {
        return Err(ArgsError("missing command".to_string()));
    };

    let command = match name.as_str() {
        "list" => match rest {
            [image, w, h] => Command::List(parse_tileset(image, w, h)?),
            _ => return Err(ArgsError("list takes <image> <tile_w> <tile_h>".to_string())),
        },
        "get" => match rest {
            [image, w, h, id] => Command::Get(parse_tileset(image, w, h)?, parse_tile_id(id)?),
            _ => {
                return Err(ArgsError(
                    "get takes <image> <tile_w> <tile_h> <id>".to_string(),
                ))
            }
        },
        "set" => match rest {
            [image, w, h, id, text] => Command::Set(
                parse_tileset(image, w, h)?,
                parse_tile_id(id)?,
                text.clone(),
            ),
            _ => {
                return Err(ArgsError(
                    "set takes <image> <tile_w> <tile_h> <id> <name>".to_string(),
                ))
            }
        },
        "watch" => {
            if rest.is_empty() || rest.len() % 3 != 0 {
                return Err(ArgsError(
                    "watch takes one or more <image> <tile_w> <tile_h> triples".to_string(),
                ));
            }
            let tilesets = rest
                .chunks(3)
                .map(|chunk| parse_tileset(&chunk[0], &chunk[1], &chunk[2]))
                .collect::<Result<Vec<_>, _>>()?;
            Command::Watch(tilesets)
        }
        other => return Err(ArgsError(format!("unknown command `{other}`"))),
    };

    Ok(Args {
        settings_path,
        command,
    })
}

fn parse_tileset(image: &str, width: &str, height: &str) -> Result<TilesetArg, ArgsError> {
    Ok(TilesetArg {
        image: PathBuf::from(image),
        tile_width: parse_tile_dim(width)?,
        tile_height: parse_tile_dim(height)?,
    })
}

fn parse_tile_dim(value: &str) -> Result<u32, ArgsError> {
    match value.parse::<u32>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ArgsError(format!("invalid tile size `{value}`"))),
    }
}

fn parse_tile_id(value: &str) -> Result<usize, ArgsError> {
    value
        .parse()
        .map_err(|_| ArgsError(format!("invalid tile id `{value}`")))
}

fn read_settings(path: Option<&PathBuf>) -> Settings {
    let settings = match path {
        Some(path) => load_settings_from(path),
        None => {
            let _ = ensure_settings_file();
            load_settings()
        }
    };
    settings.unwrap_or_default()
}

fn open(workbench: &mut Workbench, arg: &TilesetArg) -> Option<tilelayers::kernel::TilesetId> {
    let name = arg
        .image
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    match Tileset::new(name, &arg.image, arg.tile_width, arg.tile_height) {
        Ok(tileset) => Some(workbench.open_tileset(tileset)),
        Err(err) => {
            eprintln!("tilelayers: {err}");
            None
        }
    }
}

fn report(errors: &[LayerNamesError]) -> bool {
    for err in errors {
        eprintln!("tilelayers: {err}");
    }
    errors.is_empty()
}

fn run(command: Command, mut workbench: Workbench) -> ExitCode {
    let mut ok = true;
    match command {
        Command::List(arg) => {
            if open(&mut workbench, &arg).is_none() {
                return ExitCode::FAILURE;
            }
            ok &= report(&workbench.take_problems());
            if let Some(table) = workbench.layer_names().table(&arg.image) {
                for (tile_id, name) in table.named_tiles() {
                    println!("{tile_id}\t{name}");
                }
            }
        }
        Command::Get(arg, tile_id) => {
            let Some(id) = open(&mut workbench, &arg) else {
                return ExitCode::FAILURE;
            };
            ok &= report(&workbench.take_problems());
            println!("{}", workbench.layer_name(id, tile_id));
        }
        Command::Set(arg, tile_id, text) => {
            let Some(id) = open(&mut workbench, &arg) else {
                return ExitCode::FAILURE;
            };
            // never overwrite a sidecar we could not read
            if !report(&workbench.take_problems()) {
                return ExitCode::FAILURE;
            }
            if !workbench.set_layer_name(id, tile_id, &text) {
                let grid = workbench.tileset(id).map(|t| t.grid()).unwrap_or_default();
                eprintln!(
                    "tilelayers: tile {tile_id} is outside the {}x{} grid",
                    grid.columns, grid.rows
                );
                ok = false;
            }
        }
        Command::Watch(args) => return watch(&args, workbench),
    }

    ok &= report(&workbench.shutdown());
    if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn watch(args: &[TilesetArg], mut workbench: Workbench) -> ExitCode {
    for arg in args {
        if open(&mut workbench, arg).is_none() {
            return ExitCode::FAILURE;
        }
    }
    report(&workbench.take_problems());
    if !workbench.tilesets().is_watching() {
        tracing::warn!("file watching is off, images will not be reloaded");
    }

    let (tx, rx) = mpsc::channel();
    let _signal_thread = match install_termination_signals(tx) {
        Ok(handle) => handle,
        Err(err) => {
            tracing::warn!(error = %err, "failed to install signal handlers");
            None
        }
    };

    tracing::info!(tilesets = args.len(), "watching tileset images");
    let exit_code = loop {
        let now = Instant::now();
        for event in workbench.tick(now) {
            if event.missing {
                println!("{}: missing", event.image_path.display());
            } else {
                println!(
                    "{}: {}x{} -> {}x{}",
                    event.image_path.display(),
                    event.old_grid.columns,
                    event.old_grid.rows,
                    event.new_grid.columns,
                    event.new_grid.rows
                );
            }
        }
        report(&workbench.take_problems());

        let timeout = workbench
            .next_deadline()
            .map(|deadline| deadline.saturating_duration_since(now))
            .unwrap_or(IDLE_POLL)
            .min(IDLE_POLL);
        match rx.recv_timeout(timeout) {
            Ok(signal) => {
                tracing::info!(?signal, "termination requested");
                break signal.exit_code();
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => std::thread::sleep(timeout),
        }
    };

    if !report(&workbench.shutdown()) {
        return ExitCode::FAILURE;
    }
    ExitCode::from(u8::try_from(exit_code).unwrap_or(1))
}

fn main() -> ExitCode {
    let args = match parse_args(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(err) => {
            eprintln!("tilelayers: {err}");
            return ExitCode::from(2);
        }
    };

    let settings = read_settings(args.settings_path.as_ref());
    let _logging = logging::init(settings.log_filter.as_deref());

    run(args.command, Workbench::new(settings))
}

#[cfg(test)]
#[path = "../tests/unit/cli_args.rs"]
mod tests;
