use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use console::Style;

use aqualens_core::autotune::{classify_water, compute_signature};
use aqualens_core::io::image_io::load_image;
use aqualens_core::preview::PreviewState;

#[derive(Args)]
pub struct InfoArgs {
    /// Input image (PNG, TIFF, JPEG)
    pub file: PathBuf,
}

pub fn run(args: &InfoArgs) -> Result<()> {
    let image = load_image(&args.file)?;
    let state = PreviewState::new(image);
    let sig = compute_signature(state.source_preview());
    let water = classify_water(&sig);

    let label = Style::new().dim();
    let value = Style::new().bold();

    println!();
    println!(
        "  {:<22}{}x{}",
        label.apply_to("Dimensions"),
        state.source().width(),
        state.source().height()
    );
    println!(
        "  {:<22}{:.3}",
        label.apply_to("Preview scale"),
        state.scale_factor()
    );
    println!(
        "  {:<22}R {:.3}  G {:.3}  B {:.3}",
        label.apply_to("Channel means"),
        sig.means[0],
        sig.means[1],
        sig.means[2]
    );
    println!(
        "  {:<22}R/B {:.2}  R/G {:.2}  B/R {:.2}",
        label.apply_to("Channel ratios"),
        sig.r_b_ratio,
        sig.r_g_ratio,
        sig.b_r_ratio
    );
    println!(
        "  {:<22}{:.4}",
        label.apply_to("Histogram spread"),
        sig.hist_spread
    );
    println!(
        "  {:<22}{:.5}",
        label.apply_to("Laplacian variance"),
        sig.laplacian_variance
    );
    println!(
        "  {:<22}{:.4}",
        label.apply_to("Edge strength"),
        sig.sobel_mean
    );
    println!(
        "  {:<22}{:.4}",
        label.apply_to("Dark channel mean"),
        sig.dark_channel_mean
    );
    println!(
        "  {:<22}{}",
        label.apply_to("Water type"),
        value.apply_to(water)
    );
    println!();
    Ok(())
}
