pub mod io;
pub mod model;
pub mod quadrant;
pub mod surfaces;
