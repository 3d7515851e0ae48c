use crate::error::{Result, StegError};
use crate::framing::Framing;
use crate::raster::ImageFile;
use crate::stego::StegoImage;
use log::debug;
use std::path::Path;

/// Options for the info command
#[derive(Debug, Clone, Default)]
pub struct InfoOptions {
    pub framing: Framing,
    pub json: bool,
}

/// Describe an image's capacity and how much of it the current message uses
pub fn show_info(path: &Path, options: &InfoOptions) -> Result<String> {
    let file = ImageFile::open(path)?;
    let mut stego = StegoImage::with_framing(file, options.framing);
    // An image never written with this framing still has a capacity to report
    let message_found = match stego.read_bytes() {
        Ok(_) => true,
        Err(StegError::InvalidFrame(reason)) => {
            debug!("No message in {}: {}", path.display(), reason);
            false
        }
        Err(e) => return Err(e),
    };
    let report = stego.report();

    if options.json {
        let mut json = serde_json::to_string_pretty(&report)?;
        json.push('\n');
        return Ok(json);
    }

    let used = report.max_payload - report.bytes_available;
    let mut output = String::new();

    output.push_str("Stegvault Image Information\n");
    output.push_str("===========================\n\n");

    output.push_str(&format!("File: {}\n", path.display()));
    output.push_str(&format!("Image size: {} x {}\n", report.width, report.height));
    output.push_str(&format!("Framing: {:?}\n", report.framing));
    output.push('\n');

    output.push_str("Capacity:\n");
    output.push_str(&format!(
        "  Capacity: {} bytes ({})\n",
        report.capacity_bytes,
        format_size(report.capacity_bytes as u64)
    ));
    output.push_str(&format!("  Max payload: {} bytes\n", report.max_payload));
    if message_found {
        output.push_str(&format!("  Message: {} bytes\n", used));
    } else {
        output.push_str("  Message: none (no valid header)\n");
    }
    output.push_str(&format!("  Bytes available: {}\n", report.bytes_available));

    Ok(output)
}

fn format_size(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::write::{write_message, WriteOptions};
    use crate::raster::{Image, Raster, Rgb};
    use crate::stego::CapacityReport;
    use tempfile::tempdir;

    fn vault_with(message: &[u8]) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("vault.png");
        let mut file = ImageFile::from_raster(Raster::new(10, 10, Rgb::new(9, 9, 9)), &path);
        file.save().unwrap();
        write_message(&path, message, &WriteOptions::default()).unwrap();
        (dir, path)
    }

    #[test]
    fn test_show_info() {
        let (_dir, path) = vault_with(b"HELLO");
        let info = show_info(&path, &InfoOptions::default()).unwrap();

        assert!(info.contains("Image size: 10 x 10"));
        assert!(info.contains("Capacity: 37 bytes (37 B)"));
        assert!(info.contains("Message: 5 bytes"));
        assert!(info.contains("Bytes available: 32"));
    }

    #[test]
    fn test_show_info_json() {
        let (_dir, path) = vault_with(b"HI");
        let options = InfoOptions {
            json: true,
            ..Default::default()
        };
        let json = show_info(&path, &options).unwrap();
        let report: CapacityReport = serde_json::from_str(&json).unwrap();

        assert_eq!(report.capacity_bytes, 37);
        assert_eq!(report.bytes_available, 35);
        assert!(json.contains("\"framing\": \"terminator\""));
    }

    #[test]
    fn test_show_info_without_length_header() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cover.png");
        let mut file = ImageFile::from_raster(Raster::new(10, 10, Rgb::new(9, 9, 9)), &path);
        file.save().unwrap();

        let options = InfoOptions {
            framing: Framing::LengthPrefixed,
            ..Default::default()
        };
        let info = show_info(&path, &options).unwrap();
        assert!(info.contains("Max payload: 33 bytes"));
        assert!(info.contains("Message: none (no valid header)"));
        assert!(info.contains("Bytes available: 33"));

        let json_options = InfoOptions {
            framing: Framing::LengthPrefixed,
            json: true,
        };
        let report: CapacityReport =
            serde_json::from_str(&show_info(&path, &json_options).unwrap()).unwrap();
        assert_eq!(report.bytes_available, 33);
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(500), "500 B");
        assert_eq!(format_size(1024), "1.0 KB");
        assert_eq!(format_size(1536), "1.5 KB");
        assert_eq!(format_size(1048576), "1.0 MB");
    }
}
