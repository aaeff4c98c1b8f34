pub mod config;
pub mod logging;
pub mod summary;

use std::{io::Cursor, path::PathBuf};

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use config::Config;
use summary::{ChunkSummary, SubChunkSummary};
use tracing::info;
use wcodec_chunk::{Chunk, ChunkCodec, Encoding, SerialisedData};
use wcodec_defs::{BlockState, StateRegistry as _};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value = "wcodec.toml")]
    /// Config file, defaults are used if it does not exist
    config: PathBuf,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Decode a level chunk payload and print a summary
    LevelChunk {
        /// File holding the payload
        input: PathBuf,
        #[arg(short, long)]
        /// Number of sub chunks in the payload
        count: usize,
        #[arg(long, default_value_t = false)]
        /// Payload ends with 256 bytes of 2D biomes
        old_biomes: bool,
    },
    /// Decode a single sub chunk and print a summary
    SubChunk {
        input: PathBuf,
        #[arg(long, default_value_t = false)]
        /// Sub chunk was read from disk instead of the network
        disk: bool,
    },
    /// Decode a level chunk payload and write it out in the disk format
    Convert {
        input: PathBuf,
        #[arg(short, long)]
        count: usize,
        #[arg(long, default_value_t = false)]
        old_biomes: bool,
        /// Directory to write sub_chunk_{i}.bin and biomes.bin to
        output: PathBuf,
    },
    /// Decode a directory written by convert and print a summary
    Disk { input: PathBuf },
}

fn sub_chunk_file(index: usize) -> String {
    format!("sub_chunk_{}.bin", index)
}

/// Missing files read as empty blobs.
fn read_or_empty(path: PathBuf) -> Result<Vec<u8>> {
    match std::fs::read(&path) {
        Ok(data) => Ok(data),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
        Err(err) => Err(err).with_context(|| format!("reading {}", path.display())),
    }
}

fn main() -> Result<()> {
    logging::init_logging()?;
    let args = Args::parse();

    let config = Config::load(&[&args.config])?;
    let registry = config.registry()?;
    let legacy = config.legacy()?;
    let codec = ChunkCodec::new(&registry, &legacy);
    let range = config.dimension.range();
    let air = codec
        .registry()
        .resolve(&BlockState::air().name, &BlockState::air().properties)
        .context("block state registry has no air")?;
    info!(
        states = registry.len(),
        legacy = legacy.len(),
        dimension = config.dimension.name(),
        "loaded block tables"
    );

    let print = |chunk: &Chunk| -> Result<()> {
        let summary = ChunkSummary::new(config.dimension.name(), chunk, &registry);
        println!("{}", serde_json::to_string_pretty(&summary)?);
        Ok(())
    };

    match args.command {
        Commands::LevelChunk {
            input,
            count,
            old_biomes,
        } => {
            let data = std::fs::read(&input)
                .with_context(|| format!("reading {}", input.display()))?;
            print(&codec.network_decode(air, &data, count, old_biomes, range)?)?;
        }
        Commands::SubChunk { input, disk } => {
            let data = std::fs::read(&input)
                .with_context(|| format!("reading {}", input.display()))?;
            let encoding = if disk { Encoding::Disk } else { Encoding::Network };
            let chunk = Chunk::new(air, range);
            let (index, sub) = codec.decode_sub_chunk(Cursor::new(data), &chunk, 0, encoding)?;
            let summary = SubChunkSummary::new(index, chunk.sub_y(index), &sub, &registry);
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        Commands::Convert {
            input,
            count,
            old_biomes,
            output,
        } => {
            let data = std::fs::read(&input)
                .with_context(|| format!("reading {}", input.display()))?;
            let mut chunk = codec.network_decode(air, &data, count, old_biomes, range)?;
            chunk.compact();
            let SerialisedData { sub_chunks, biomes } = codec.encode(&chunk, Encoding::Disk)?;

            std::fs::create_dir_all(&output)?;
            for (index, blob) in sub_chunks.iter().enumerate() {
                if chunk.sub_chunks()[index].is_empty() {
                    continue;
                }
                std::fs::write(output.join(sub_chunk_file(index)), blob)?;
            }
            std::fs::write(output.join("biomes.bin"), biomes)?;
            info!(output = %output.display(), "converted chunk");
        }
        Commands::Disk { input } => {
            let data = SerialisedData {
                sub_chunks: (0..range.sub_chunk_count())
                    .map(|index| read_or_empty(input.join(sub_chunk_file(index))))
                    .collect::<Result<_>>()?,
                biomes: read_or_empty(input.join("biomes.bin"))?,
            };
            print(&codec.disk_decode(&data, range)?)?;
        }
    }

    Ok(())
}
