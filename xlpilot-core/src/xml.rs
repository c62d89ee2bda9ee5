//! XML gateway for the configuration graph and its sub-exports.
//!
//! Field-to-element mapping comes from the serde attributes on the models:
//! each field is an element, each list item a repeated child element.

use std::fs;
use std::io;
use std::path::Path;

use quick_xml::events::{BytesText, Event};
use quick_xml::reader::Reader;
use quick_xml::se::Serializer;
use quick_xml::writer::Writer;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::XlPilotError;

const XML_DECLARATION: &str = "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n";
const BYTE_ORDER_MARK: char = '\u{feff}';
const IN_MEMORY_ORIGIN: &str = "<memory>";

/// Render `value` as an indented XML document.
pub fn to_xml_string<T>(value: &T) -> Result<String, XlPilotError>
where
    T: Serialize,
{
    let mut body = String::new();
    let mut serializer = Serializer::new(&mut body);
    serializer.indent(' ', 2);
    value.serialize(serializer)?;
    Ok(format!("{XML_DECLARATION}{body}\n"))
}

/// Parse a document whose root element must be `expected_root`.
pub fn from_xml_str<T>(
    xml: &str,
    expected_root: &str,
) -> Result<T, XlPilotError>
where
    T: DeserializeOwned,
{
    decode(xml, expected_root, IN_MEMORY_ORIGIN)
}

/// Write `value` to `path`, creating parent directories as needed.
pub fn serialize_to_file<T>(value: &T, path: &Path) -> Result<(), XlPilotError>
where
    T: Serialize,
{
    if path.file_name().is_none() || path.is_dir() {
        return Err(XlPilotError::InvalidDestination(path.to_path_buf()));
    }
    if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty())
    {
        fs::create_dir_all(dir)?;
    }

    let payload = to_xml_string(value)?;
    fs::write(path, payload.as_bytes())?;
    log::debug!("wrote {} bytes to {}", payload.len(), path.display());
    Ok(())
}

/// Read `path` and decode it; the root element must be `expected_root`.
pub fn deserialize_from_file<T>(
    path: &Path,
    expected_root: &str,
) -> Result<T, XlPilotError>
where
    T: DeserializeOwned,
{
    if !path.exists() {
        return Err(XlPilotError::FileNotFound(path.to_path_buf()));
    }
    let origin = path.display().to_string();
    let contents = fs::read_to_string(path).map_err(|err| {
        if err.kind() == io::ErrorKind::InvalidData {
            XlPilotError::Malformed {
                origin: origin.clone(),
                reason: err.to_string(),
            }
        } else {
            XlPilotError::Io(err)
        }
    })?;
    decode(&contents, expected_root, &origin)
}

fn decode<T>(
    xml: &str,
    expected_root: &str,
    origin: &str,
) -> Result<T, XlPilotError>
where
    T: DeserializeOwned,
{
    let xml = xml.trim_start_matches(BYTE_ORDER_MARK);
    let malformed = |reason: String| XlPilotError::Malformed {
        origin: origin.to_string(),
        reason,
    };

    let root = root_element(xml).map_err(malformed)?;
    if root != expected_root {
        return Err(malformed(format!(
            "expected root element <{expected_root}>, found <{root}>"
        )));
    }

    let protected = protect_text_edges(xml).map_err(malformed)?;
    quick_xml::de::from_str(&protected)
        .map_err(|err| malformed(err.to_string()))
}

/// Rewrite leading and trailing whitespace of leaf element text as
/// character references.
///
/// The deserializer trims raw text before resolving references, so values
/// such as `" XL "` survive decoding. Indentation between elements is left
/// untouched.
fn protect_text_edges(xml: &str) -> Result<String, String> {
    let mut reader = Reader::from_str(xml);
    let mut writer = Writer::new(Vec::new());
    let mut after_start = false;
    let mut pending: Option<BytesText<'_>> = None;

    loop {
        let event = reader.read_event().map_err(|err| err.to_string())?;
        if let Some(text) = pending.take() {
            let text = if matches!(event, Event::End(_)) {
                let raw = std::str::from_utf8(&text)
                    .map_err(|err| err.to_string())?;
                BytesText::from_escaped(escape_edges(raw))
            } else {
                text.into_owned()
            };
            writer
                .write_event(Event::Text(text))
                .map_err(|err| err.to_string())?;
        }
        match event {
            Event::Eof => break,
            Event::Text(text) if after_start => {
                after_start = false;
                pending = Some(text);
            },
            other => {
                after_start = matches!(other, Event::Start(_));
                writer.write_event(other).map_err(|err| err.to_string())?;
            },
        }
    }
    String::from_utf8(writer.into_inner()).map_err(|err| err.to_string())
}

fn escape_edges(raw: &str) -> String {
    let body = raw.trim_matches(is_xml_space);
    if body.is_empty() {
        // Line breaks inside an otherwise empty element are indentation.
        if raw.contains('\n') {
            return raw.to_string();
        }
        return raw.chars().map(char_reference).collect();
    }
    let lead_len = raw.len() - raw.trim_start_matches(is_xml_space).len();
    let trail_start = raw.trim_end_matches(is_xml_space).len();

    let mut escaped: String =
        raw[..lead_len].chars().map(char_reference).collect();
    escaped.push_str(body);
    escaped.extend(raw[trail_start..].chars().map(char_reference));
    escaped
}

fn is_xml_space(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\r' | '\n')
}

fn char_reference(c: char) -> String {
    format!("&#x{:X};", u32::from(c))
}

fn root_element(xml: &str) -> Result<String, String> {
    let mut reader = Reader::from_str(xml);
    loop {
        match reader.read_event() {
            Ok(Event::Start(tag)) | Ok(Event::Empty(tag)) => {
                return Ok(
                    String::from_utf8_lossy(tag.name().as_ref()).into_owned()
                );
            },
            Ok(Event::Eof) => {
                return Err(String::from("document has no root element"));
            },
            Ok(_) => {},
            Err(err) => return Err(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::time::{SystemTime, UNIX_EPOCH};

    use super::{
        deserialize_from_file, from_xml_str, serialize_to_file, to_xml_string,
    };
    use crate::error::XlPilotError;
    use crate::model::{
        BUTTON_EXPORT_ROOT, ButtonExport, ButtonKind, ButtonRecord, ButtonSet,
        CONFIG_ROOT, Configuration, InstallationPath, PATH_EXPORT_ROOT,
        PathExport,
    };

    fn sample_configuration() -> Configuration {
        let mut config = Configuration::default();
        config.installation_paths_mut().push(
            InstallationPath::new("Path1", "C:\\Path1")
                .with_database("DB1")
                .with_license("Server1", "Key1"),
        );
        config
            .buttons_mut(ButtonSet::Primary)
            .push(ButtonRecord::new("XLButton1", "xl1.exe").elevated(true));
        config.buttons_mut(ButtonSet::Secondary).push(
            ButtonRecord::special("Temp", "OpenTempFolder")
                .with_tool_tip("Open temp"),
        );
        config.set_flag(1, true);
        config.set_window_size(1024, 768);
        config
    }

    #[test]
    fn given_configuration_when_serialized_and_parsed_then_values_match() {
        let config = sample_configuration();

        let xml = to_xml_string(&config).expect("configuration should encode");
        let parsed: Configuration =
            from_xml_str(&xml, CONFIG_ROOT)
                .expect("configuration should decode");

        assert_eq!(parsed, config);
        let path = &parsed.installation_paths()[0];
        assert_eq!(path.license_server, "Server1");
        assert!(parsed.buttons(ButtonSet::Primary)[0].run_as_admin);
    }

    #[test]
    fn given_configuration_when_serialized_then_elements_use_field_names() {
        let xml = to_xml_string(&sample_configuration())
            .expect("configuration should encode");

        assert!(xml.starts_with("<?xml"));
        assert!(xml.contains("<XLPilotConfig>"));
        assert!(xml.contains("<Name>Path1</Name>"));
        assert!(xml.contains("<RunAsAdmin>true</RunAsAdmin>"));
        assert!(xml.contains("<ButtonType>SystemSpecial</ButtonType>"));
        assert!(
            xml.contains("<ActionIdentifier>OpenTempFolder</ActionIdentifier>")
        );
    }

    #[test]
    fn given_legacy_button_without_type_when_parsed_then_defaults_applied() {
        let xml = r#"<?xml version="1.0" encoding="utf-8"?>
<XLPilotConfig>
  <XLButtons>
    <ButtonRecord>
      <ButtonText>Old</ButtonText>
      <FileName>old.exe</FileName>
      <RunAsAdmin>false</RunAsAdmin>
    </ButtonRecord>
  </XLButtons>
</XLPilotConfig>"#;

        let parsed: Configuration =
            from_xml_str(xml, CONFIG_ROOT).expect("legacy file should decode");
        let parsed = parsed.normalized();

        let button = &parsed.buttons(ButtonSet::Primary)[0];
        assert_eq!(button.button_type, ButtonKind::UserStandard);
        assert_eq!(button.action_identifier, "");
        assert_eq!(parsed.flags().len(), 3);
        assert_eq!(parsed.window_size(), (0, 0));
    }

    #[test]
    fn given_out_of_range_button_type_when_parsed_then_unknown_kind() {
        let xml = r#"<ButtonExport>
  <ButtonRecord>
    <ButtonText>Future</ButtonText>
    <ButtonType>7</ButtonType>
  </ButtonRecord>
</ButtonExport>"#;

        let parsed: ButtonExport = from_xml_str(xml, BUTTON_EXPORT_ROOT)
            .expect("unknown type should not fail decoding");

        assert_eq!(
            parsed.items[0].button_type,
            ButtonKind::Unknown(String::from("7"))
        );
        let encoded = to_xml_string(&parsed).expect("export should encode");
        assert!(encoded.contains("<ButtonType>7</ButtonType>"));
    }

    #[test]
    fn given_values_with_edge_whitespace_when_round_tripped_then_kept() {
        let mut config = Configuration::default();
        config
            .installation_paths_mut()
            .push(InstallationPath::new(" XL ", "C:\\XL "));
        config.buttons_mut(ButtonSet::Primary).push(
            ButtonRecord::new("XL", "xl.exe")
                .with_arguments("-custom arg1 arg2 ")
                .with_tool_tip("  "),
        );

        let xml = to_xml_string(&config).expect("configuration should encode");
        let parsed: Configuration = from_xml_str(&xml, CONFIG_ROOT)
            .expect("configuration should decode");

        assert_eq!(parsed, config);
        assert_eq!(parsed.installation_paths()[0].name, " XL ");
    }

    #[test]
    fn given_indented_file_with_escaped_text_when_parsed_then_values_exact() {
        let xml = r#"<PathExport>
  <InstallationPath>
    <Name>  A &amp; B</Name>
    <Path>
C:\XL</Path>
  </InstallationPath>
</PathExport>"#;

        let parsed: PathExport = from_xml_str(xml, PATH_EXPORT_ROOT)
            .expect("export should decode");

        assert_eq!(parsed.items[0].name, "  A & B");
        assert_eq!(parsed.items[0].path, "\nC:\\XL");
        assert_eq!(parsed.items[0].database, "");
    }

    #[test]
    fn given_empty_list_spanning_lines_when_parsed_then_list_empty() {
        let xml = "<XLPilotConfig>\n  <XLButtons>\n  </XLButtons>\n\
                   </XLPilotConfig>";

        let parsed: Configuration =
            from_xml_str(xml, CONFIG_ROOT).expect("config should decode");

        assert!(parsed.buttons(ButtonSet::Primary).is_empty());
    }

    #[test]
    fn given_wrong_root_when_parsed_then_malformed_error() {
        let result: Result<Configuration, _> =
            from_xml_str("<Something/>", CONFIG_ROOT);

        assert!(matches!(result, Err(XlPilotError::Malformed { .. })));
    }

    #[test]
    fn given_missing_file_when_deserialized_then_file_not_found() {
        let root = test_temp_dir("missing");
        let result: Result<Configuration, _> =
            deserialize_from_file(&root.join("absent.xml"), CONFIG_ROOT);

        assert!(matches!(result, Err(XlPilotError::FileNotFound(_))));
        fs::remove_dir_all(&root)
            .expect("temporary directory should be removed");
    }

    #[test]
    fn given_non_utf8_file_when_deserialized_then_malformed() {
        let root = test_temp_dir("non_utf8");
        let path = root.join("config.xml");
        fs::write(&path, [0x3C, 0xFF, 0xFE, 0x3E])
            .expect("test payload should be written");

        let result: Result<Configuration, _> =
            deserialize_from_file(&path, CONFIG_ROOT);

        assert!(matches!(result, Err(XlPilotError::Malformed { .. })));
        fs::remove_dir_all(&root)
            .expect("temporary directory should be removed");
    }

    #[test]
    fn given_directory_as_destination_when_serialized_then_invalid_destination()
    {
        let root = test_temp_dir("invalid_destination");

        let result = serialize_to_file(&Configuration::default(), &root);

        assert!(matches!(result, Err(XlPilotError::InvalidDestination(_))));
        fs::remove_dir_all(&root)
            .expect("temporary directory should be removed");
    }

    #[test]
    fn given_configuration_when_written_and_read_then_round_trip_matches() {
        let root = test_temp_dir("round_trip");
        let path = root.join("nested").join("config.xml");
        let config = sample_configuration();

        serialize_to_file(&config, &path).expect("configuration should save");
        let loaded: Configuration = deserialize_from_file(&path, CONFIG_ROOT)
            .expect("configuration should load");

        assert_eq!(loaded, config);
        fs::remove_dir_all(&root)
            .expect("temporary directory should be removed");
    }

    fn test_temp_dir(test_name: &str) -> std::path::PathBuf {
        let stamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock should be monotonic")
            .as_nanos();
        let dir = std::env::temp_dir().join(format!(
            "xlpilot-xml-{test_name}-{stamp}-{}",
            std::process::id()
        ));

        fs::create_dir_all(&dir)
            .expect("temporary directory should be created");
        dir
    }
}
