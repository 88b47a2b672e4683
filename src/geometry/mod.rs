pub mod polygon;
pub mod raster;
