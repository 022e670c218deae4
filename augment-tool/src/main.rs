use anyhow::{bail, Context, Result};
use clap::Parser;
use image::{GrayImage, Luma, Rgb, RgbImage};
use log::info;
use ndarray::{Array3, ArrayD, Axis, Ix3};
use prettytable::{cell, row, Table};
use rand::{rngs::StdRng, SeedableRng};
use std::{
    collections::HashSet,
    fs,
    path::{Path, PathBuf},
};
use vsr_augment::{PipelineInit, Sample, Value};

#[derive(Debug, Clone, Parser)]
enum Opts {
    /// Print the transforms of a pipeline configuration.
    Info {
        /// pipeline configuration file
        config_file: PathBuf,
    },
    /// Augment a set of images with a pipeline.
    Run {
        /// pipeline configuration file
        config_file: PathBuf,
        /// color image in KEY=PATH form
        #[clap(long = "input", parse(try_from_str = parse_key_path))]
        inputs: Vec<(String, PathBuf)>,
        /// grayscale mask in KEY=PATH form
        #[clap(long = "mask", parse(try_from_str = parse_key_path))]
        masks: Vec<(String, PathBuf)>,
        /// output directory
        #[clap(long)]
        output_dir: PathBuf,
        /// random seed
        #[clap(long)]
        seed: Option<u64>,
    },
}

fn main() -> Result<()> {
    let mut builder = pretty_env_logger::formatted_builder();
    builder.parse_filters(&std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()));
    builder.init();

    match Opts::parse() {
        Opts::Info { config_file } => {
            print_info(config_file)?;
        }
        Opts::Run {
            config_file,
            inputs,
            masks,
            output_dir,
            seed,
        } => {
            run(config_file, &inputs, &masks, output_dir, seed)?;
        }
    }

    Ok(())
}

fn parse_key_path(text: &str) -> Result<(String, PathBuf), String> {
    match text.split_once('=') {
        Some((key, path)) if !key.is_empty() && !path.is_empty() => {
            Ok((key.to_owned(), PathBuf::from(path)))
        }
        _ => Err(format!("expect KEY=PATH, but get '{}'", text)),
    }
}

fn print_info(config_file: impl AsRef<Path>) -> Result<()> {
    let pipeline = PipelineInit::open(config_file)?.build()?;

    let mut table = Table::new();
    table.add_row(row!["index", "transform", "config"]);
    for (index, transform) in pipeline.transforms().iter().enumerate() {
        table.add_row(row![
            index,
            transform.to_string(),
            serde_json::to_string(&transform.to_init())?
        ]);
    }
    table.printstd();

    Ok(())
}

fn run(
    config_file: impl AsRef<Path>,
    inputs: &[(String, PathBuf)],
    masks: &[(String, PathBuf)],
    output_dir: impl AsRef<Path>,
    seed: Option<u64>,
) -> Result<()> {
    let output_dir = output_dir.as_ref();
    let pipeline = PipelineInit::open(config_file)?.build()?;
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let mut sample = Sample::new();
    for (key, path) in inputs {
        sample.insert(key.as_str(), load_color(path)?);
    }
    for (key, path) in masks {
        sample.insert(key.as_str(), load_mask(path)?);
    }
    let mask_keys: HashSet<&str> = masks.iter().map(|(key, _)| key.as_str()).collect();

    pipeline.apply(&mut sample, &mut rng)?;

    fs::create_dir_all(output_dir)
        .with_context(|| format!("failed to create '{}'", output_dir.display()))?;

    let mut meta = serde_json::Map::new();
    for (key, value) in sample.iter() {
        let is_mask = mask_keys.contains(key);
        match value {
            Value::Image(image) => {
                save_image(image, is_mask, &output_dir.join(format!("{}.png", key)))?;
            }
            Value::IntImage(image) => {
                let image = image.mapv(|value| value as f32);
                save_image(&image, true, &output_dir.join(format!("{}.png", key)))?;
            }
            Value::Frames(frames) => {
                for (index, frame) in frames.iter().enumerate() {
                    save_image(frame, is_mask, &output_dir.join(format!("{}_{}.png", key, index)))?;
                }
            }
            other => {
                meta.insert(key.to_owned(), serde_json::to_value(other)?);
            }
        }
    }

    let meta_file = output_dir.join("meta.json");
    fs::write(&meta_file, serde_json::to_string_pretty(&meta)?)
        .with_context(|| format!("failed to write '{}'", meta_file.display()))?;
    info!("wrote augmented sample to '{}'", output_dir.display());

    Ok(())
}

/// Loads a BGR image with pixel values within `[0, 255]`.
fn load_color(path: &Path) -> Result<Array3<f32>> {
    let image = image::open(path)
        .with_context(|| format!("failed to open '{}'", path.display()))?
        .to_rgb8();
    let (w, h) = image.dimensions();
    let array = Array3::from_shape_fn((h as usize, w as usize, 3), |(y, x, c)| {
        image.get_pixel(x as u32, y as u32)[2 - c] as f32
    });
    Ok(array)
}

/// Loads a single-channel mask with values within `[0, 1]`.
fn load_mask(path: &Path) -> Result<Array3<f32>> {
    let image = image::open(path)
        .with_context(|| format!("failed to open '{}'", path.display()))?
        .to_luma8();
    let (w, h) = image.dimensions();
    let array = Array3::from_shape_fn((h as usize, w as usize, 1), |(y, x, _)| {
        image.get_pixel(x as u32, y as u32)[0] as f32 / 255.0
    });
    Ok(array)
}

fn save_image(image: &ArrayD<f32>, is_mask: bool, path: &Path) -> Result<()> {
    let image = match image.ndim() {
        2 => image.view().insert_axis(Axis(2)),
        3 => image.view(),
        _ => bail!("cannot save array of shape {:?}", image.shape()),
    };
    let image = image.into_dimensionality::<Ix3>()?;
    let (h, w, c) = image.dim();
    let scale = if is_mask { 255.0 } else { 1.0 };
    let to_u8 = |value: f32| (value * scale).round().clamp(0.0, 255.0) as u8;

    match c {
        1 => {
            GrayImage::from_fn(w as u32, h as u32, |x, y| {
                Luma([to_u8(image[[y as usize, x as usize, 0]])])
            })
            .save(path)?;
        }
        3 => {
            RgbImage::from_fn(w as u32, h as u32, |x, y| {
                let (x, y) = (x as usize, y as usize);
                Rgb([
                    to_u8(image[[y, x, 2]]),
                    to_u8(image[[y, x, 1]]),
                    to_u8(image[[y, x, 0]]),
                ])
            })
            .save(path)?;
        }
        _ => bail!("cannot save image with {} channels to '{}'", c, path.display()),
    }

    Ok(())
}
