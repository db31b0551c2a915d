mod test_models;

#[cfg(feature = "allow_filesystem")]
mod test_urdf;

#[cfg(feature = "allow_filesystem")]
mod test_from_yaml;
