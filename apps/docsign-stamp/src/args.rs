//! Command-line argument types

use clap::{Parser, Subcommand};
use docsign_core::{ImageEncoding, Rectangle, ViewportFrame};
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Parser, Debug)]
#[command(name = "docsign-stamp")]
#[command(about = "Stamp signature images onto PDF pages and verify signed documents")]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Place a signature image on a page
    Sign(SignArgs),
    /// Re-hash a signed document against its audit records
    Verify(VerifyArgs),
    /// Print page count and page sizes
    Inspect(InspectArgs),
}

#[derive(Parser, Debug)]
pub struct SignArgs {
    /// PDF to sign
    #[arg(short, long)]
    pub input: PathBuf,

    /// Signature image (PNG or JPEG)
    #[arg(long)]
    pub image: PathBuf,

    /// Declared image encoding; guessed from the file when omitted
    #[arg(long)]
    pub encoding: Option<ImageEncoding>,

    /// Zero-based page index
    #[arg(long, default_value = "0")]
    pub page: u32,

    /// Placement box in viewport pixels as x,y,width,height (repeatable)
    #[arg(long = "rect", required = true)]
    pub rects: Vec<RectArg>,

    /// Viewport size as width,height; defaults to the page size in points
    #[arg(long)]
    pub viewport: Option<SizeArg>,

    /// Signer identity recorded in the audit trail
    #[arg(long)]
    pub signer: String,

    /// Document identifier; defaults to the input file stem
    #[arg(long)]
    pub document_id: Option<String>,

    /// Where to write the signed PDF
    #[arg(short, long)]
    pub output: PathBuf,

    /// Where to write audit records as JSON
    #[arg(long)]
    pub audit: Option<PathBuf>,

    /// TOML configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,
}

#[derive(Parser, Debug)]
pub struct VerifyArgs {
    /// Signed PDF to check
    #[arg(short, long)]
    pub input: PathBuf,

    /// Audit records written by `sign`; updated in place
    #[arg(long)]
    pub audit: PathBuf,
}

#[derive(Parser, Debug)]
pub struct InspectArgs {
    #[arg(short, long)]
    pub input: PathBuf,
}

fn parse_numbers<const N: usize>(s: &str, what: &str) -> Result<[f64; N], String> {
    let parts: Vec<&str> = s.split(',').map(str::trim).collect();
    if parts.len() != N {
        return Err(format!(
            "{} needs {} comma-separated numbers, got '{}'",
            what, N, s
        ));
    }

    let mut values = [0.0; N];
    for (slot, part) in values.iter_mut().zip(&parts) {
        *slot = part
            .parse()
            .map_err(|_| format!("'{}' is not a number in {} '{}'", part, what, s))?;
    }
    Ok(values)
}

/// `x,y,width,height` in viewport pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RectArg(pub Rectangle);

impl FromStr for RectArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let [x, y, w, h] = parse_numbers::<4>(s, "rect")?;
        Ok(RectArg(Rectangle::viewport(x, y, w, h)))
    }
}

/// `width,height` in viewport pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SizeArg(pub ViewportFrame);

impl FromStr for SizeArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let [w, h] = parse_numbers::<2>(s, "viewport")?;
        Ok(SizeArg(ViewportFrame::new(w, h)))
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: any four finite numbers written as x,y,w,h parse back unchanged
        #[test]
        fn rect_parses_formatted_numbers(
            x in -1e6f64..1e6,
            y in -1e6f64..1e6,
            w in 0f64..1e6,
            h in 0f64..1e6,
        ) {
            let text = format!("{},{},{},{}", x, y, w, h);
            let parsed: RectArg = text.parse().unwrap();
            prop_assert_eq!(parsed.0, Rectangle::viewport(x, y, w, h));
        }
    }
}
