//! YAML persistence for a fitted [`crate::motif::Motif`] (§4.F, §6 model file
//! format).

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, SeqbiasError};
use crate::motif::Motif;

/// On-disk representation of one position's conditional tables. Field names
/// match §6's model file format exactly.
#[derive(Debug, Serialize, Deserialize)]
struct MotifDoc {
    n: usize,
    k: u32,
    parents: Vec<Vec<usize>>,
    fg: Vec<Vec<f64>>,
    bg: Vec<Vec<f64>>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ModelDoc {
    #[serde(rename = "L")]
    l: i64,
    #[serde(rename = "R")]
    r: i64,
    motif: MotifDoc,
}

impl From<&Motif> for ModelDoc {
    fn from(m: &Motif) -> Self {
        ModelDoc {
            l: m.l,
            r: m.r,
            motif: MotifDoc {
                n: m.n_w(),
                k: 4,
                parents: m.parents.clone(),
                fg: m.fg_tables.clone(),
                bg: m.bg_tables.clone(),
            },
        }
    }
}

impl From<ModelDoc> for Motif {
    fn from(doc: ModelDoc) -> Self {
        Motif {
            l: doc.l,
            r: doc.r,
            parents: doc.motif.parents,
            fg_tables: doc.motif.fg,
            bg_tables: doc.motif.bg,
            trivial: false,
        }
    }
}

/// A fitted motif bound to the reference path it was trained/loaded against
/// (§3 PosTable/Motif lifecycles: the motif itself carries no reference
/// handle, so callers thread `ref_path` through to `predict`).
#[derive(Debug, Clone)]
pub struct Model {
    pub motif: Motif,
    pub ref_path: PathBuf,
}

/// Writes `model` as YAML to `path` (§6 model file format).
pub fn save(model: &Model, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path).map_err(|e| SeqbiasError::IoFailure {
        context: format!("creating model file {path:?}"),
        source: e,
    })?;
    let doc = ModelDoc::from(&model.motif);
    serde_yaml::to_writer(BufWriter::new(file), &doc)
        .map_err(|e| SeqbiasError::InvalidInput(format!("serializing model: {e}")))?;
    Ok(())
}

/// Loads a model from `path`, binding it to `ref_path` (the caller's FASTA
/// reference, not stored in the file itself).
pub fn load(ref_path: impl Into<PathBuf>, path: impl AsRef<Path>) -> Result<Model> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| SeqbiasError::MissingInput {
        path: path.to_path_buf(),
        source: e,
    })?;
    let doc: ModelDoc = serde_yaml::from_reader(BufReader::new(file))
        .map_err(|e| SeqbiasError::InvalidInput(format!("parsing model file {path:?}: {e}")))?;
    Ok(Model {
        motif: Motif::from(doc),
        ref_path: ref_path.into(),
    })
}
