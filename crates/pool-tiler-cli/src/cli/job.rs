//! Job files: declarative descriptions of a pool and its surroundings.
//!
//! A job is a YAML (or JSON, by extension) file naming the outlines and
//! configs each command needs. Points are written either as `[x, y]` pairs
//! or as `{x: .., y: ..}` maps.
//!
//! ```yaml
//! units: mm
//! snap: 10
//! pool:
//!   outline: [[0, 0], [6000, 0], [6000, 3000], [0, 3000]]
//!   coping: { tileWidth: 400, tileDepth: 400, grout: 5 }
//! paving:
//!   boundary: [[-2000, -2000], [8000, -2000], [8000, 5000], [-2000, 5000]]
//!   config: { paverWidth: 600, paverHeight: 400 }
//! ```

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use pool_tiler::snap::{canvas_point_to_mm, snap_point};
use pool_tiler::{CopingConfig, ExcludeZone, PavingConfig, Point};

/// A complete job description.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    /// Optional title, echoed in logs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Unit of every coordinate in the file.
    #[serde(default)]
    pub units: Units,

    /// Grid pitch (in job units) every point is snapped to on load.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snap: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pool: Option<PoolSection>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paving: Option<PavingSection>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extension: Option<ExtensionSection>,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    #[default]
    Mm,
    /// Editor stage units (10 mm each).
    Canvas,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolSection {
    pub outline: Vec<JobPoint>,
    #[serde(default)]
    pub coping: CopingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PavingSection {
    pub boundary: Vec<JobPoint>,
    #[serde(default)]
    pub config: PavingConfig,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclude: Vec<Vec<JobPoint>>,
    /// Treat the pool outline as an exclude zone too.
    #[serde(default = "default_true")]
    pub exclude_pool: bool,
}

/// Which base layout an extension grows.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtensionBase {
    #[default]
    Coping,
    Paving,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtensionSection {
    #[serde(default)]
    pub base: ExtensionBase,
    /// The edited boundary.
    pub boundary: Vec<JobPoint>,
    /// Boundary before editing; derived from the base layout when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_boundary: Option<Vec<JobPoint>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site: Option<Vec<JobPoint>>,
}

fn default_true() -> bool {
    true
}

/// A point as written in a job file.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum JobPoint {
    Pair([f64; 2]),
    Map { x: f64, y: f64 },
}

impl From<JobPoint> for Point {
    fn from(p: JobPoint) -> Self {
        match p {
            JobPoint::Pair([x, y]) => Point::new(x, y),
            JobPoint::Map { x, y } => Point::new(x, y),
        }
    }
}

impl From<Point> for JobPoint {
    fn from(p: Point) -> Self {
        JobPoint::Pair([p.x, p.y])
    }
}

impl Job {
    /// Load a job, picking the parser from the file extension.
    pub fn load(path: &Path) -> Result<Job> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read job file {}", path.display()))?;
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        Self::parse(&content, is_json).with_context(|| format!("invalid job file {}", path.display()))
    }

    pub fn parse(content: &str, is_json: bool) -> Result<Job> {
        let job = if is_json {
            serde_json::from_str(content)?
        } else {
            serde_yaml::from_str(content)?
        };
        Ok(job)
    }

    /// Snap, then convert to millimeters.
    pub fn points(&self, raw: &[JobPoint]) -> Vec<Point> {
        raw.iter()
            .map(|&p| {
                let p = Point::from(p);
                let p = match self.snap {
                    Some(pitch) => snap_point(p, pitch),
                    None => p,
                };
                match self.units {
                    Units::Mm => p,
                    Units::Canvas => canvas_point_to_mm(p),
                }
            })
            .collect()
    }

    pub fn pool(&self) -> Result<&PoolSection> {
        match &self.pool {
            Some(pool) => Ok(pool),
            None => bail!("job has no `pool` section"),
        }
    }

    pub fn paving(&self) -> Result<&PavingSection> {
        match &self.paving {
            Some(paving) => Ok(paving),
            None => bail!("job has no `paving` section"),
        }
    }

    pub fn extension(&self) -> Result<&ExtensionSection> {
        match &self.extension {
            Some(extension) => Ok(extension),
            None => bail!("job has no `extension` section"),
        }
    }

    pub fn pool_outline(&self) -> Option<Vec<Point>> {
        self.pool.as_ref().map(|pool| self.points(&pool.outline))
    }

    /// Exclude zones for paving: the listed ones plus the pool if asked.
    pub fn exclude_zones(&self, paving: &PavingSection) -> Vec<ExcludeZone> {
        let mut zones: Vec<ExcludeZone> = paving
            .exclude
            .iter()
            .map(|zone| ExcludeZone::new(self.points(zone)))
            .collect();
        if paving.exclude_pool {
            if let Some(outline) = self.pool_outline() {
                zones.push(ExcludeZone {
                    points: outline,
                    id: Some("pool".to_string()),
                });
            }
        }
        zones
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const YAML: &str = r#"
units: canvas
snap: 5
pool:
  outline: [[0, 0], [600, 0], [600, 302], {x: 0, y: 300}]
  coping: { tileWidth: 500, grout: 3 }
paving:
  boundary: [[-200, -200], [800, -200], [800, 500], [-200, 500]]
  exclude:
    - [[700, 400], [750, 400], [750, 450]]
"#;

    #[test]
    fn parses_yaml_job() {
        let job = Job::parse(YAML, false).unwrap();
        assert_eq!(job.units, Units::Canvas);
        let pool = job.pool().unwrap();
        assert_eq!(pool.coping.tile_width, 500.0);
        // Unset fields keep their defaults.
        assert_eq!(pool.coping.tile_depth, 400.0);
        assert!(job.extension().is_err());
    }

    #[test]
    fn points_are_snapped_then_scaled() {
        let job = Job::parse(YAML, false).unwrap();
        let outline = job.pool_outline().unwrap();
        assert_eq!(outline[2], Point::new(6000.0, 3000.0));
        assert_eq!(outline[3], Point::new(0.0, 3000.0));
    }

    #[test]
    fn pool_joins_exclude_zones() {
        let job = Job::parse(YAML, false).unwrap();
        let zones = job.exclude_zones(job.paving().unwrap());
        assert_eq!(zones.len(), 2);
        assert_eq!(zones[1].id.as_deref(), Some("pool"));
    }

    #[test]
    fn parses_json_job() {
        let json = r#"{"pool": {"outline": [[0,0],[10,0],[10,10]]}}"#;
        let job = Job::parse(json, true).unwrap();
        assert_eq!(job.units, Units::Mm);
        assert_eq!(job.pool_outline().unwrap().len(), 3);
    }
}
