use anyhow::Result;
use ndarray::{Array2, Array3};
use rand::{prelude::*, rngs::StdRng};
use std::path::{Path, PathBuf};
use vsr_augment::{
    processor::{FlipInit, RandomMaskDilationInit},
    Pipeline, PipelineInit, Sample, TransformError, TransformInit,
};

lazy_static::lazy_static! {
    static ref CONFIG_FILE: PathBuf = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("cfg")
        .join("pipeline.json5");
}

fn training_sample(rng: &mut StdRng) -> Sample {
    let mut image = |h: usize, w: usize, c: usize| Array3::from_shape_fn((h, w, c), |_| rng.gen::<f32>());
    let lq = image(30, 20, 3);
    let gt = image(120, 80, 3);
    let fg = image(48, 40, 3).mapv(|v| v * 255.0);
    let alpha = image(48, 40, 1);
    let mask = image(24, 24, 1);

    Sample::new()
        .with("lq", lq)
        .with("gt", gt)
        .with("fg", fg)
        .with("alpha", alpha)
        .with("mask", mask)
        .with("gt_path", "fake_gt_path")
}

#[test]
fn load_pipeline_config() -> Result<()> {
    let init = PipelineInit::open(&*CONFIG_FILE)?;
    assert_eq!(init.transforms.len(), 8);

    let pipeline = init.clone().build()?;
    let names: Vec<_> = pipeline
        .transforms()
        .iter()
        .map(|transform| transform.name())
        .collect();
    assert_eq!(
        names,
        [
            "Resize",
            "Flip",
            "RandomTransposeHW",
            "RandomAffine",
            "RandomJitter",
            "RandomMaskDilation",
            "BinarizeImage",
            "Pad"
        ]
    );

    // the normalized snapshot builds an equivalent pipeline
    let snapshot = pipeline.init();
    let text = serde_json::to_string(&snapshot)?;
    let reloaded: PipelineInit = serde_json::from_str(&text)?;
    assert_eq!(reloaded, snapshot);
    assert_eq!(reloaded.build()?.to_string(), pipeline.to_string());
    Ok(())
}

#[test]
fn run_pipeline() -> Result<()> {
    let pipeline = PipelineInit::open(&*CONFIG_FILE)?.build()?;
    let mut rng = StdRng::seed_from_u64(0);

    let mut sample = training_sample(&mut rng);
    pipeline.apply(&mut sample, &mut rng)?;

    let lq = sample.image("lq")?.shape().to_vec();
    let gt = sample.image("gt")?.shape().to_vec();
    assert!(lq == [15, 10, 3] || lq == [10, 15, 3]);
    assert!(gt == [64, 48, 3] || gt == [48, 64, 3]);
    assert_eq!(sample.image("fg")?.shape(), &[48, 40, 3]);
    assert!(sample.image("alpha")?.iter().all(|&v| v == 0.0 || v == 1.0));
    assert_eq!(sample.image("mask")?.shape(), &[24, 24, 1]);
    assert!(sample.contains_key("flip"));
    assert!(sample.contains_key("transpose"));
    assert!(sample.contains_key("mask_dilate_kernel_size"));
    assert_eq!(sample.get_str("gt_path")?, "fake_gt_path");

    // identical seeds reproduce identical samples
    let run = |seed: u64| -> Result<Sample> {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut sample = training_sample(&mut rng);
        pipeline.apply(&mut sample, &mut rng)?;
        Ok(sample)
    };
    assert_eq!(run(42)?, run(42)?);
    Ok(())
}

#[test]
fn pipeline_reports_failing_transform() -> Result<()> {
    let pipeline: Pipeline = vec![
        TransformInit::Flip(FlipInit::new(&["lq"], 1.0, None)?).build()?,
        TransformInit::RandomMaskDilation(RandomMaskDilationInit::new(&["mask"], 3, 3)).build()?,
    ]
    .into_iter()
    .collect();

    let mut sample = Sample::new().with("lq", Array2::<f32>::zeros((4, 4)));
    let err = pipeline
        .apply(&mut sample, &mut StdRng::seed_from_u64(0))
        .unwrap_err();
    match &err {
        TransformError::Pipeline { index, name, .. } => {
            assert_eq!(*index, 1);
            assert_eq!(*name, "RandomMaskDilation");
        }
        other => panic!("unexpected error {:?}", other),
    }
    assert!(err.root().is_lookup_error());
    // the transforms before the failure are applied
    assert!(sample.get_bool("flip")?);

    let init = PipelineInit {
        transforms: vec![
            TransformInit::Flip(FlipInit::new(&["lq"], 0.5, Some("horizontal"))?),
            TransformInit::RandomMaskDilation(RandomMaskDilationInit::new(&["mask"], 4, 4)),
        ],
    };
    let err = init.build().unwrap_err();
    assert!(matches!(err, TransformError::Pipeline { index: 1, .. }));
    assert!(err.root().is_value_error());
    Ok(())
}

#[test]
fn reject_unknown_transform() {
    let text = r#"{ transforms: [{ type: "Rotate", keys: ["lq"] }] }"#;
    assert!(json5::from_str::<PipelineInit>(text).is_err());

    let text = r#"{ transforms: [{ type: "Flip", keys: ["lq"], direction: "vertically" }] }"#;
    assert!(json5::from_str::<PipelineInit>(text).is_err());
}
