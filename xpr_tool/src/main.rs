use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;
use xpr_texture::{
    package_from_texture, palette_from_bytes, save_bmp, upload_texture, CreateImageError, Padding,
    Surface, TextureDescriptor, TextureFormat, UploadSink,
};

#[derive(Parser, Debug)]
#[command(
    name = "xpr_tool",
    about = "Decode legacy console texture packages and generate block codec test packages."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Decode the texture in a package to a 24-bit BMP image
    Decode {
        /// Input texture package path
        input: PathBuf,

        /// Output BMP path
        output: PathBuf,

        /// Palette resource with 256 little-endian ARGB entries for paletted textures
        #[arg(long, value_name = "PATH")]
        palette: Option<PathBuf>,

        /// Pad the image to power of two dimensions by repeating the edges
        #[arg(long, action = clap::ArgAction::SetTrue)]
        pad: bool,
    },
    /// Write packages covering every endpoint combination for each block format
    Generate {
        /// Output directory for the generated packages
        output_dir: PathBuf,
    },
}

// Writes each uploaded surface to a BMP file.
struct BmpSink {
    path: PathBuf,
    padding: Padding,
}

impl UploadSink for BmpSink {
    type Error = CreateImageError;

    fn padding(&self) -> Padding {
        self.padding
    }

    fn upload(&mut self, surface: Surface<Vec<u8>>) -> Result<(), Self::Error> {
        save_bmp(&surface, &self.path)
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Decode {
            input,
            output,
            palette,
            pad,
        } => decode(&input, &output, palette.as_deref(), pad),
        Command::Generate { output_dir } => generate(&output_dir),
    }
}

fn decode(input: &Path, output: &Path, palette: Option<&Path>, pad: bool) -> anyhow::Result<()> {
    let package =
        std::fs::read(input).with_context(|| format!("failed to read {}", input.display()))?;

    let palette = palette
        .map(|path| {
            let bytes = std::fs::read(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            palette_from_bytes(&bytes).with_context(|| format!("invalid palette {}", path.display()))
        })
        .transpose()?;

    let mut sink = BmpSink {
        path: output.to_owned(),
        padding: if pad {
            Padding::PowerOfTwo
        } else {
            Padding::Disabled
        },
    };

    upload_texture(&mut sink, &package, palette.as_ref())
        .with_context(|| format!("failed to decode {}", input.display()))?;

    info!(input = %input.display(), output = %output.display(), "decoded texture");
    Ok(())
}

// Legacy format decoding behavior can be tested exhaustively.
// Each generated texture has one block for every pair of endpoints.
fn generate(output_dir: &Path) -> anyhow::Result<()> {
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("failed to create {}", output_dir.display()))?;

    let textures = [
        ("dxt1_r.xpr", dxt1_r()),
        ("dxt1_g.xpr", dxt1_g()),
        ("dxt1_b.xpr", dxt1_b()),
        ("dxt2_a.xpr", dxt2_a()),
        ("dxt4_r.xpr", dxt4_r()),
        ("dxt4_g.xpr", dxt4_g()),
        ("dxt4_b.xpr", dxt4_b()),
    ];

    for (name, (descriptor, data)) in textures {
        let path = output_dir.join(name);
        std::fs::write(&path, package_from_texture(&descriptor, &data))
            .with_context(|| format!("failed to write {}", path.display()))?;

        info!(
            path = %path.display(),
            format = %descriptor.format,
            width = descriptor.width,
            height = descriptor.height,
            "generated package"
        );
    }

    Ok(())
}

fn dxt1_r() -> (TextureDescriptor, Vec<u8>) {
    // 5-bit independent R channel for DXT1 end points.
    blocks(5, TextureFormat::Dxt1, |i, j| {
        dxt1_block(i, 0, 0, j, 0, 0).to_le_bytes()
    })
}

fn dxt1_g() -> (TextureDescriptor, Vec<u8>) {
    // 6-bit independent G channel for DXT1 end points.
    blocks(6, TextureFormat::Dxt1, |i, j| {
        dxt1_block(0, i, 0, 0, j, 0).to_le_bytes()
    })
}

fn dxt1_b() -> (TextureDescriptor, Vec<u8>) {
    // 5-bit independent B channel for DXT1 end points.
    blocks(5, TextureFormat::Dxt1, |i, j| {
        dxt1_block(0, 0, i, 0, 0, j).to_le_bytes()
    })
}

fn dxt1_block(r0: u64, g0: u64, b0: u64, r1: u64, g1: u64, b1: u64) -> u64 {
    let c0 = (r0 << 11) | (g0 << 5) | b0;
    let c1 = (r1 << 11) | (g1 << 5) | b1;

    // Use each unique 2-bit value for the 4x4 indices.
    let indices = bit_indices(4 * 4, 2);

    (indices << 32) | (c1 << 16) | c0
}

fn dxt2_a() -> (TextureDescriptor, Vec<u8>) {
    // 4-bit explicit alpha with a red gradient to show the color block.
    blocks(4, TextureFormat::Dxt2, |i, j| {
        dxt2_block(i, (j * 2, 0, 0), (31 - j * 2, 0, 0)).to_le_bytes()
    })
}

fn dxt2_block(alpha: u64, rgb0: (u64, u64, u64), rgb1: (u64, u64, u64)) -> u128 {
    let (r0, g0, b0) = rgb0;
    let (r1, g1, b1) = rgb1;

    // Every pixel uses the same 4-bit alpha.
    let alpha_block = (0..16).fold(0u64, |block, i| block | (alpha << (i * 4)));

    ((dxt1_block(r0, g0, b0, r1, g1, b1) as u128) << 64) | alpha_block as u128
}

fn dxt4_r() -> (TextureDescriptor, Vec<u8>) {
    // 5-bit independent R channel for DXT4 end points.
    // 8-bit alpha end points require more pixels.
    blocks(8, TextureFormat::Dxt4, |i, j| {
        dxt4_block((i % 32, 0, 0, i), (j % 32, 0, 0, j)).to_le_bytes()
    })
}

fn dxt4_g() -> (TextureDescriptor, Vec<u8>) {
    // 6-bit independent G channel for DXT4 end points.
    // 8-bit alpha end points require more pixels.
    blocks(8, TextureFormat::Dxt4, |i, j| {
        dxt4_block((0, i % 64, 0, i), (0, j % 64, 0, j)).to_le_bytes()
    })
}

fn dxt4_b() -> (TextureDescriptor, Vec<u8>) {
    // 5-bit independent B channel for DXT4 end points.
    // 8-bit alpha end points require more pixels.
    blocks(8, TextureFormat::Dxt4, |i, j| {
        dxt4_block((0, 0, i % 32, i), (0, 0, j % 32, j)).to_le_bytes()
    })
}

fn dxt4_block(rgba0: (u64, u64, u64, u64), rgba1: (u64, u64, u64, u64)) -> u128 {
    let (r0, g0, b0, a0) = rgba0;
    let (r1, g1, b1, a1) = rgba1;
    let alpha_block = interpolated_alpha_block(a0, a1);
    // DXT4 combines a DXT1 color block with a separate alpha block.
    ((dxt1_block(r0, g0, b0, r1, g1, b1) as u128) << 64) | alpha_block as u128
}

fn interpolated_alpha_block(a0: u64, a1: u64) -> u64 {
    // Use each unique 3-bit value for the 4x4 indices.
    let indices = bit_indices(4 * 4, 3);
    (indices << 16) | (a1 << 8) | a0
}

fn blocks<const N: usize, F>(
    bits: u64,
    format: TextureFormat,
    block: F,
) -> (TextureDescriptor, Vec<u8>)
where
    F: Fn(u64, u64) -> [u8; N],
{
    let blocks = 1 << bits;
    let mut data = Vec::new();
    for i in 0..blocks {
        for j in 0..blocks {
            let bytes = block(i, j);
            data.extend_from_slice(&bytes);
        }
    }

    let width = blocks as u32 * 4;
    let height = blocks as u32 * 4;
    let descriptor = TextureDescriptor {
        format,
        width,
        height,
        pitch: width * format.bytes_per_pixel(),
        data_offset: 0,
        mipmaps: 1,
    };
    (descriptor, data)
}

fn bit_indices(count: u64, bits: u64) -> u64 {
    // Repeat unique bit patterns for count.
    let mut indices = 0;
    for i in 0..count {
        indices |= (i % (1 << bits)) << (i * bits);
    }
    indices
}
