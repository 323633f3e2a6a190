use crate::config::ClassifierConfig;
use crate::error::AppError;
use ndarray::Array4;
use ort::session::Session;
use ort::value::Value;
use std::path::{Path, PathBuf};
use tracing::info;

/// A loaded model that maps an input tensor to one raw score per class.
pub trait ClassifierEngine: Send {
    fn infer(&mut self, input: Array4<f32>) -> Result<Vec<f32>, AppError>;

    /// Class names, indexed like the scores `infer` returns.
    fn labels(&self) -> &[String];
}

/// Builds engines. Kept separate from the engine so a failed build can be
/// retried later with the same configuration.
pub trait EngineFactory: Send + Sync {
    fn build(&self, config: &ClassifierConfig) -> Result<Box<dyn ClassifierEngine>, AppError>;
}

pub struct OrtEngine {
    session: Session,
    input_name: String,
    labels: Vec<String>,
}

impl ClassifierEngine for OrtEngine {
    fn infer(&mut self, input: Array4<f32>) -> Result<Vec<f32>, AppError> {
        let input_tensor = Value::from_array(input)
            .map_err(|e| AppError::inference(format!("Failed to create tensor value: {}", e)))?;

        let outputs = self
            .session
            .run(ort::inputs![self.input_name.as_str() => input_tensor])
            .map_err(|e| AppError::inference(format!("Inference failed: {}", e)))?;

        let output_value = outputs
            .values()
            .next()
            .ok_or_else(|| AppError::inference("Model produced no outputs"))?;

        let (_, data) = output_value
            .try_extract_tensor::<f32>()
            .map_err(|e| AppError::inference(format!("Failed to extract output tensor: {}", e)))?;

        Ok(data.to_vec())
    }

    fn labels(&self) -> &[String] {
        &self.labels
    }
}

/// ONNX Runtime engines built from the bundled `models/` directory.
pub struct OrtEngineFactory {
    model_dir: PathBuf,
}

impl OrtEngineFactory {
    pub fn new(model_dir: PathBuf) -> Self {
        Self { model_dir }
    }
}

impl EngineFactory for OrtEngineFactory {
    fn build(&self, config: &ClassifierConfig) -> Result<Box<dyn ClassifierEngine>, AppError> {
        let labels = load_labels(&self.model_dir.join(&config.labels_name))?;

        let model_path = self.model_dir.join(&config.model_name);
        if !model_path.exists() {
            return Err(AppError::engine(format!(
                "Model file not found: {}",
                model_path.display()
            )));
        }

        let _ = ort::init().with_name("asclepius").commit();

        let session = Session::builder()
            .map_err(|e| AppError::engine(format!("Failed to create session builder: {}", e)))?
            .with_optimization_level(ort::session::builder::GraphOptimizationLevel::Level3)
            .map_err(|e| AppError::engine(format!("Failed to set optimization level: {}", e)))?
            .with_intra_threads(config.num_threads)
            .map_err(|e| AppError::engine(format!("Failed to set intra threads: {}", e)))?
            .with_execution_providers([
                ort::ep::CPU::default().build(),
            ])
            .map_err(|e| AppError::engine(format!("Failed to register CPU execution provider: {}", e)))?
            .commit_from_file(&model_path)
            .map_err(|e| AppError::engine(format!("Failed to load ONNX model: {}", e)))?;

        let input_name = session
            .inputs()
            .first()
            .map(|input| input.name().to_string())
            .ok_or_else(|| AppError::engine("Model declares no inputs"))?;

        info!(
            model = %model_path.display(),
            classes = labels.len(),
            threads = config.num_threads,
            "classifier engine ready"
        );

        Ok(Box::new(OrtEngine {
            session,
            input_name,
            labels,
        }))
    }
}

/// Read class names from a label sidecar: `{"id2label": {"0": "Cancer", "1": "Non Cancer"}}`.
pub fn load_labels(path: &Path) -> Result<Vec<String>, AppError> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        AppError::engine(format!("Failed to read labels file {}: {}", path.display(), e))
    })?;

    let config: serde_json::Value = serde_json::from_str(&content)
        .map_err(|e| AppError::engine(format!("Failed to parse labels JSON: {}", e)))?;

    let id2label = config["id2label"]
        .as_object()
        .ok_or_else(|| AppError::engine("Labels file missing id2label field"))?;

    let mut labels = id2label
        .iter()
        .map(|(k, v)| {
            let idx = k
                .parse::<usize>()
                .map_err(|_| AppError::engine(format!("Invalid label index: {}", k)))?;
            let label = v
                .as_str()
                .ok_or_else(|| AppError::engine(format!("Label {} is not a string", k)))?;
            Ok((idx, label.to_string()))
        })
        .collect::<Result<Vec<(usize, String)>, AppError>>()?;

    labels.sort_by_key(|(idx, _)| *idx);
    Ok(labels.into_iter().map(|(_, label)| label).collect())
}
