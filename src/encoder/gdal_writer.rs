use gdal::cpl::CslStringList;
use gdal::raster::Buffer;
use gdal::{Dataset, DriverManager, Metadata};
use std::path::Path;
use tracing::{debug, warn};

use super::{EncodeError, EncodePlan, GridWriter};

/// Writes plans through GDAL. The plan is assembled in a `MEM` dataset and copied to the target
/// driver, netCDF unless configured otherwise.
#[derive(Debug, Clone)]
pub struct GdalWriter {
    driver: String,
}

impl Default for GdalWriter {
    fn default() -> Self {
        Self {
            driver: "netCDF".to_string(),
        }
    }
}

impl GdalWriter {
    pub fn new(driver: impl Into<String>) -> Self {
        Self {
            driver: driver.into(),
        }
    }

    pub fn driver(&self) -> &str {
        &self.driver
    }

    fn global_key(&self, key: &str) -> String {
        if self.driver.eq_ignore_ascii_case("netcdf") {
            format!("NC_GLOBAL#{}", key)
        } else {
            key.to_string()
        }
    }

    fn build(&self, plan: &EncodePlan<'_>) -> Result<Dataset, EncodeError> {
        let (rows, cols) = plan.shape;
        let mem = DriverManager::get_driver_by_name("MEM")?;
        let mut dataset = mem.create_with_band_type::<f64, _>("", cols, rows, plan.bands.len())?;

        if let Some(transform) = plan.geo_transform() {
            dataset.set_geo_transform(&transform)?;
        }
        for (key, value) in &plan.metadata {
            dataset.set_metadata_item(&self.global_key(key), value, "")?;
        }

        for (index, band_plan) in plan.bands.iter().enumerate() {
            let mut band = dataset.rasterband(index + 1)?;
            let data: Vec<f64> = band_plan.data.iter().copied().collect();
            let mut buffer = Buffer::new((cols, rows), data);
            band.write((0, 0), (cols, rows), &mut buffer)?;

            band.set_description(&band_plan.name)?;
            band.set_metadata_item("NETCDF_VARNAME", &band_plan.name, "")?;
            if let Some(fill) = band_plan.fill_value {
                band.set_no_data_value(Some(fill))?;
            }
            for (key, value) in &band_plan.attributes {
                band.set_metadata_item(key, value, "")?;
            }
            debug!("Band {} <- {}", index + 1, band_plan.name);
        }

        Ok(dataset)
    }
}

impl GridWriter for GdalWriter {
    fn write(&self, plan: &EncodePlan<'_>, path: &Path) -> Result<(), EncodeError> {
        let result = self.build(plan).and_then(|dataset| {
            let driver = DriverManager::get_driver_by_name(&self.driver)?;
            dataset.create_copy(&driver, path, &CslStringList::new())?;
            Ok(())
        });

        if result.is_err() && path.exists() {
            warn!("Removing partial output {}", path.display());
            std::fs::remove_file(path)?;
        }

        result
    }
}
