use std::fs::File;
use std::io::BufWriter;
use std::io::Read;
use std::io::Write;
use std::path::Path;

use crate::result::Pb2CnfResult;

#[derive(Hash, Eq, PartialEq, Copy, Clone, Debug)]
pub(crate) enum FileFormat {
    CnfDimacsPLine,
    WcnfDimacsPLine,
    Opb,
}

impl FileFormat {
    /// Detects the format from the extension, looking through a trailing `.gz`.
    pub(crate) fn from_path(path: &Path) -> Option<FileFormat> {
        let path = if is_compressed(path) {
            Path::new(path.file_stem()?)
        } else {
            path
        };

        match path.extension()?.to_str()? {
            "cnf" => Some(FileFormat::CnfDimacsPLine),
            "wcnf" => Some(FileFormat::WcnfDimacsPLine),
            "opb" => Some(FileFormat::Opb),
            _ => None,
        }
    }
}

fn is_compressed(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "gz")
}

pub(crate) fn open_instance(path: &Path) -> Pb2CnfResult<Box<dyn Read>> {
    let file = File::open(path)?;

    if is_compressed(path) {
        decompress(file)
    } else {
        Ok(Box::new(file))
    }
}

pub(crate) fn create_output(path: &Path) -> Pb2CnfResult<Box<dyn Write>> {
    let file = File::create(path)?;

    if is_compressed(path) {
        compress(file)
    } else {
        Ok(Box::new(BufWriter::new(file)))
    }
}

#[cfg(feature = "gzip")]
fn decompress(file: File) -> Pb2CnfResult<Box<dyn Read>> {
    Ok(Box::new(flate2::read::GzDecoder::new(file)))
}

#[cfg(not(feature = "gzip"))]
fn decompress(_: File) -> Pb2CnfResult<Box<dyn Read>> {
    Err(crate::result::Pb2CnfError::GzipDisabled)
}

#[cfg(feature = "gzip")]
fn compress(file: File) -> Pb2CnfResult<Box<dyn Write>> {
    let encoder = flate2::write::GzEncoder::new(file, flate2::Compression::default());
    Ok(Box::new(BufWriter::new(encoder)))
}

#[cfg(not(feature = "gzip"))]
fn compress(_: File) -> Pb2CnfResult<Box<dyn Write>> {
    Err(crate::result::Pb2CnfError::GzipDisabled)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_are_detected_through_gz() {
        assert_eq!(
            Some(FileFormat::Opb),
            FileFormat::from_path(Path::new("data/instance.opb.gz"))
        );
        assert_eq!(
            Some(FileFormat::CnfDimacsPLine),
            FileFormat::from_path(Path::new("instance.cnf"))
        );
        assert_eq!(
            Some(FileFormat::WcnfDimacsPLine),
            FileFormat::from_path(Path::new("instance.wcnf"))
        );
        assert_eq!(None, FileFormat::from_path(Path::new("instance.gz")));
        assert_eq!(None, FileFormat::from_path(Path::new("instance.lp")));
    }
}
