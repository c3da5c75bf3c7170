//! Factory-level settings and the request builder.

use chip_common::{AffineTransform, ChipResult, Coordinate, OutputFormat, ProjectionInfo};
use earth_engine::{ComputePixelsRequest, Expression, GridDimensions, PixelGrid};

use crate::config::RunConfig;
use crate::params::{ChipAnchor, ChipParams};

/// Everything a chip request needs apart from its coordinate.
///
/// Resolved once per `chip()` call.
#[derive(Debug, Clone, PartialEq)]
pub struct FactorySettings {
    pub image: String,
    pub bands: Vec<String>,
    pub projection: ProjectionInfo,
    pub scale_x: f64,
    /// Negated vertical scale of the resolved projection.
    pub scale_y: f64,
    pub output_format: OutputFormat,
    pub chip_x: u32,
    pub chip_y: u32,
    pub workload_tag: String,
    pub request_limit: u32,
    pub anchor: ChipAnchor,
}

impl FactorySettings {
    pub fn resolve(
        config: &RunConfig,
        params: &ChipParams,
        projection: ProjectionInfo,
    ) -> ChipResult<Self> {
        projection.validate()?;
        Ok(Self {
            image: config.image().to_string(),
            bands: params.bands.clone(),
            scale_x: projection.scale_x(),
            scale_y: projection.north_up_scale_y(),
            projection,
            output_format: config.output_format(),
            chip_x: params.chip_x,
            chip_y: params.chip_y,
            workload_tag: params.workload_tag.clone(),
            request_limit: params.request_limit,
            anchor: params.anchor,
        })
    }

    /// Upper-left corner of the chip grid for `coordinate`.
    pub fn grid_origin(&self, coordinate: &Coordinate) -> Coordinate {
        match self.anchor {
            ChipAnchor::UpperLeft => *coordinate,
            ChipAnchor::Center => Coordinate::new(
                coordinate.x - f64::from(self.chip_x) / 2.0 * self.scale_x,
                coordinate.y - f64::from(self.chip_y) / 2.0 * self.scale_y,
            ),
        }
    }

    /// Build the pixel request for one coordinate.
    pub fn build_request(&self, coordinate: &Coordinate) -> ComputePixelsRequest {
        ComputePixelsRequest {
            expression: Expression::image_load(&self.image),
            file_format: self.output_format,
            band_ids: self.bands.clone(),
            grid: PixelGrid {
                dimensions: GridDimensions {
                    width: self.chip_x,
                    height: self.chip_y,
                },
                affine_transform: AffineTransform::axis_aligned(
                    self.scale_x,
                    self.scale_y,
                    self.grid_origin(coordinate),
                ),
                crs_code: self.projection.crs.clone(),
            },
            workload_tag: self.workload_tag.clone(),
        }
    }
}
