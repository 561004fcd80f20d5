//! Line-oriented driver for the maze device.
//!
//! Reads one command per line from stdin and acts as a single client whose
//! owner id is this process id. `help` lists the commands.

use std::io::{self, BufRead, Write};

use anyhow::{Context, bail};
use mazebox_engine::Coord;
use mazebox_server::{OwnerId, TableConfig};
use mazebox_server::device::{MazeCommand, MazeDevice, Reply, data_errno, ioctl_errno};
use mazebox_wire::encode_move_batch;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

const HELP: &str = "\
commands:
  create W H        generate a W x H maze
  move DX DY        apply one delta
  batch DX DY ...   apply several deltas in one write
  reset             return to the start cell
  pos | start | end | size
  bitmap            print the wall bitmap
  destroy           drop the maze
  proc              show every slot
  quit";

fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = TableConfig::from_env();
    let device = MazeDevice::new(config);
    let owner = std::process::id();
    tracing::info!(owner, "mazebox ready");

    let stdin = io::stdin();
    let mut stdout = io::stdout().lock();
    for line in stdin.lock().lines() {
        let line = line.context("failed to read stdin")?;
        let words: Vec<&str> = line.split_whitespace().collect();
        let Some((&verb, args)) = words.split_first() else {
            continue;
        };
        if verb == "quit" {
            break;
        }

        match run(&device, owner, verb, args) {
            Ok(output) => writeln!(stdout, "{output}")?,
            Err(error) => writeln!(stdout, "error: {error:#}")?,
        }
    }

    device.release(owner);
    Ok(())
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("mazebox=info,mazebox_server=info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(true).with_writer(io::stderr))
        .init();
}

fn run(device: &MazeDevice, owner: OwnerId, verb: &str, args: &[&str]) -> anyhow::Result<String> {
    let command = match verb {
        "help" => return Ok(HELP.to_string()),
        "proc" => return Ok(device.proc_read()),
        "bitmap" => {
            let bitmap = device
                .read(owner)
                .map_err(|e| anyhow::anyhow!("{e} (errno {})", data_errno(&e)))?;
            return render_bitmap(&bitmap, device, owner);
        }
        "batch" => {
            let deltas = parse_pairs(args)?;
            let written = device
                .write(owner, &encode_move_batch(&deltas))
                .map_err(|e| anyhow::anyhow!("{e} (errno {})", data_errno(&e)))?;
            return Ok(format!("wrote {written} bytes"));
        }
        "create" => {
            let [width, height] = parse_ints::<2>(args)?;
            MazeCommand::Create { width, height }
        }
        "move" => {
            let [dx, dy] = parse_ints::<2>(args)?;
            MazeCommand::Move(Coord::new(dx, dy))
        }
        "reset" => MazeCommand::Reset,
        "destroy" => MazeCommand::Destroy,
        "size" => MazeCommand::GetSize,
        "pos" => MazeCommand::GetPos,
        "start" => MazeCommand::GetStart,
        "end" => MazeCommand::GetEnd,
        other => bail!("unknown command `{other}` (try `help`)"),
    };

    match device.ioctl(owner, command) {
        Ok(Reply::Done) => Ok("ok".to_string()),
        Ok(Reply::Coord(c)) => Ok(c.to_string()),
        Err(e) => bail!("{e} (errno {})", ioctl_errno(&e)),
    }
}

fn render_bitmap(bitmap: &[u8], device: &MazeDevice, owner: OwnerId) -> anyhow::Result<String> {
    let bounds = device.table().bounds(owner)?;
    let width = usize::try_from(bounds.x).context("negative width")?;
    Ok(bitmap
        .chunks(width)
        .map(|row| row.iter().map(|&b| if b == 1 { '1' } else { '0' }).collect::<String>())
        .collect::<Vec<_>>()
        .join("\n"))
}

fn parse_ints<const N: usize>(args: &[&str]) -> anyhow::Result<[i32; N]> {
    if args.len() != N {
        bail!("expected {N} integers, got {}", args.len());
    }
    let mut out = [0; N];
    for (slot, arg) in out.iter_mut().zip(args) {
        *slot = arg
            .parse()
            .with_context(|| format!("`{arg}` is not an integer"))?;
    }
    Ok(out)
}

fn parse_pairs(args: &[&str]) -> anyhow::Result<Vec<Coord>> {
    if args.len() % 2 != 0 {
        bail!("batch needs DX DY pairs, got {} numbers", args.len());
    }
    args.chunks_exact(2)
        .map(|pair| {
            let [dx, dy] = parse_ints::<2>(pair)?;
            Ok(Coord::new(dx, dy))
        })
        .collect()
}
