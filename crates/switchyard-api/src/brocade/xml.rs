// Brocade NOS XML payloads and response parsing.
//
// Responses are small documents rooted at the resource that was requested
// (`<trunk>`, `<mode>`), every element in the brocade-interface namespace.
// Parsing flattens a document into `(path, text)` leaves keyed by local
// element names, e.g. `trunk/allowed/vlan/add`.

use quick_xml::NsReader;
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::{Namespace, ResolveResult};

use crate::error::Error;
use crate::trunk::{SwitchportMode, TrunkState, expand_vlan_list};

/// XML namespace of every interface resource served by the REST API.
pub const BROCADE_NAMESPACE: &str = "urn:brocade.com:mgmt:brocade-interface";

/// A parsed response: root element plus its text-bearing leaves.
#[derive(Debug)]
struct Document {
    root: String,
    leaves: Vec<(String, String)>,
}

impl Document {
    fn leaf(&self, path: &str) -> Option<&str> {
        self.leaves
            .iter()
            .find(|(p, _)| p == path)
            .map(|(_, text)| text.as_str())
    }
}

fn local_name(element: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(element.local_name().as_ref()).into_owned()
}

fn parse_document(xml: &str, expected_root: &str) -> Result<Document, Error> {
    let mut reader = NsReader::from_str(xml);
    reader.trim_text(true);

    let mut stack: Vec<String> = Vec::new();
    let mut root: Option<String> = None;
    let mut leaves = Vec::new();

    loop {
        match reader.read_resolved_event()? {
            (ns, Event::Start(element)) => {
                if root.is_none() {
                    check_root(&ns, &element, expected_root)?;
                    root = Some(local_name(&element));
                }
                stack.push(local_name(&element));
            }
            (ns, Event::Empty(element)) => {
                if root.is_none() {
                    check_root(&ns, &element, expected_root)?;
                    root = Some(local_name(&element));
                }
            }
            (_, Event::Text(text)) => {
                if !stack.is_empty() {
                    leaves.push((stack.join("/"), text.unescape()?.into_owned()));
                }
            }
            (_, Event::End(_)) => {
                stack.pop();
            }
            (_, Event::Eof) => break,
            _ => {}
        }
    }

    let root = root.ok_or_else(|| Error::protocol("empty XML response"))?;
    Ok(Document { root, leaves })
}

/// The root must be the requested resource, bound to [`BROCADE_NAMESPACE`]
/// either as the default namespace or through a prefix.
fn check_root(
    ns: &ResolveResult<'_>,
    element: &BytesStart<'_>,
    expected_root: &str,
) -> Result<(), Error> {
    let name = local_name(element);
    if name != expected_root {
        return Err(Error::protocol(format!(
            "expected <{expected_root}> response, got <{name}>"
        )));
    }
    match ns {
        ResolveResult::Bound(Namespace(ns)) if *ns == BROCADE_NAMESPACE.as_bytes() => Ok(()),
        ResolveResult::Bound(Namespace(ns)) => Err(Error::protocol(format!(
            "<{name}> is in namespace {:?}, expected {BROCADE_NAMESPACE:?}",
            String::from_utf8_lossy(ns)
        ))),
        ResolveResult::Unknown(prefix) => Err(Error::protocol(format!(
            "<{name}> uses undeclared prefix {:?}",
            String::from_utf8_lossy(prefix)
        ))),
        ResolveResult::Unbound => Err(Error::protocol(format!("<{name}> carries no namespace"))),
    }
}

/// Parse a `GET .../switchport/mode` response.
pub fn parse_mode(xml: &str) -> Result<SwitchportMode, Error> {
    let doc = parse_document(xml, "mode")?;
    let raw = doc
        .leaf("mode/vlan-mode")
        .ok_or_else(|| Error::protocol(format!("<{}> has no vlan-mode", doc.root)))?;
    raw.parse()
        .map_err(|_| Error::protocol(format!("unknown vlan-mode {raw:?}")))
}

/// Parse a `GET .../switchport/trunk` response.
///
/// A missing `native-vlan` or `allowed/vlan/add` element means nothing is
/// configured there; only malformed documents are errors.
pub fn parse_trunk(xml: &str) -> Result<TrunkState, Error> {
    let doc = parse_document(xml, "trunk")?;
    let native_vlan = doc.leaf("trunk/native-vlan").map(str::to_owned);
    let allowed_vlans = match doc.leaf("trunk/allowed/vlan/add") {
        Some(list) => expand_vlan_list(list)
            .map_err(|token| Error::protocol(format!("bad vlan {token:?} in allowed list")))?,
        None => Vec::new(),
    };
    Ok(TrunkState {
        native_vlan,
        allowed_vlans,
    })
}

// ── Request payloads ─────────────────────────────────────────────────

pub fn mode_payload(mode: SwitchportMode) -> String {
    format!("<mode><vlan-mode>{mode}</vlan-mode></mode>")
}

pub fn add_vlan_payload(vlan: &str) -> String {
    format!("<vlan><add>{vlan}</add></vlan>")
}

pub fn remove_vlan_payload(vlan: &str) -> String {
    format!("<vlan><remove>{vlan}</remove></vlan>")
}

pub fn native_vlan_payload(vlan: &str) -> String {
    format!("<native-vlan>{vlan}</native-vlan>")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const MODE_ACCESS: &str = r#"
<mode xmlns="urn:brocade.com:mgmt:brocade-interface" xmlns:y="http://brocade.com/ns/rest"
y:self="/rest/config/running/interface/TenGigabitEthernet/%22101/0/10%22/switchport/mode">
  <vlan-mode>access</vlan-mode>
  <private-vlan y:self="/rest/config/running/interface/TenGigabitEthernet/%22101/0/10%22/switchport/mode/private-vlan">
    <trunk y:self="/rest/config/running/interface/TenGigabitEthernet/%22101/0/10%22/switchport/mode/private-vlan/trunk"/>
  </private-vlan>
</mode>
"#;

    const TRUNK_NO_NATIVE: &str = r#"
<trunk xmlns="urn:brocade.com:mgmt:brocade-interface" xmlns:y="http://brocade.com/ns/rest">
  <allowed>
    <rspan-vlan/>
    <vlan>
      <add>1,4001,4004,4025,4050</add>
    </vlan>
  </allowed>
  <tag>
    <native-vlan>true</native-vlan>
  </tag>
</trunk>
"#;

    const TRUNK_NATIVE_ONLY: &str = r#"
<trunk xmlns="urn:brocade.com:mgmt:brocade-interface" xmlns:y="http://brocade.com/ns/rest">
  <allowed>
    <rspan-vlan/>
    <vlan/>
  </allowed>
  <tag>
    <native-vlan>true</native-vlan>
  </tag>
  <native-vlan>10</native-vlan>
</trunk>
"#;

    #[test]
    fn parses_access_mode() {
        assert_eq!(parse_mode(MODE_ACCESS).unwrap(), SwitchportMode::Access);
    }

    #[test]
    fn tag_element_is_not_the_native_vlan() {
        let state = parse_trunk(TRUNK_NO_NATIVE).unwrap();
        assert_eq!(state.native_vlan, None);
        assert_eq!(state.allowed_vlans, vec!["1", "4001", "4004", "4025", "4050"]);
    }

    #[test]
    fn empty_allowed_vlan_element_means_no_tagged_vlans() {
        let state = parse_trunk(TRUNK_NATIVE_ONLY).unwrap();
        assert_eq!(state.native_vlan.as_deref(), Some("10"));
        assert!(state.allowed_vlans.is_empty());
    }

    #[test]
    fn rejects_foreign_namespace() {
        let xml = r#"<trunk xmlns="urn:example:other"><native-vlan>10</native-vlan></trunk>"#;
        assert!(matches!(parse_trunk(xml), Err(Error::Protocol { .. })));
    }

    #[test]
    fn accepts_prefixed_namespace() {
        let xml = r#"<br:trunk xmlns:br="urn:brocade.com:mgmt:brocade-interface">
  <br:native-vlan>10</br:native-vlan>
  <br:allowed><br:vlan><br:add>100,200</br:add></br:vlan></br:allowed>
</br:trunk>"#;
        let state = parse_trunk(xml).unwrap();
        assert_eq!(state.native_vlan.as_deref(), Some("10"));
        assert_eq!(state.allowed_vlans, vec!["100", "200"]);
    }

    #[test]
    fn rejects_prefixed_foreign_namespace() {
        let xml = r#"<x:trunk xmlns:x="urn:example:other" xmlns="urn:brocade.com:mgmt:brocade-interface"/>"#;
        assert!(matches!(parse_trunk(xml), Err(Error::Protocol { .. })));
    }

    #[test]
    fn out_of_range_allowed_vlans_are_rejected() {
        let xml = r#"<trunk xmlns="urn:brocade.com:mgmt:brocade-interface">
  <allowed><vlan><add>1-2000000</add></vlan></allowed>
</trunk>"#;
        assert!(matches!(parse_trunk(xml), Err(Error::Protocol { .. })));
    }

    #[test]
    fn rejects_unexpected_root() {
        let xml = r#"<access xmlns="urn:brocade.com:mgmt:brocade-interface"><vlan>10</vlan></access>"#;
        assert!(matches!(parse_trunk(xml), Err(Error::Protocol { .. })));
    }

    #[test]
    fn missing_vlan_mode_is_an_error() {
        let xml = r#"<mode xmlns="urn:brocade.com:mgmt:brocade-interface"/>"#;
        assert!(matches!(parse_mode(xml), Err(Error::Protocol { .. })));
    }

    #[test]
    fn empty_body_is_an_error() {
        assert!(parse_trunk("").is_err());
    }

    #[test]
    fn payloads() {
        assert_eq!(
            mode_payload(SwitchportMode::Trunk),
            "<mode><vlan-mode>trunk</vlan-mode></mode>"
        );
        assert_eq!(add_vlan_payload("102"), "<vlan><add>102</add></vlan>");
        assert_eq!(remove_vlan_payload("102"), "<vlan><remove>102</remove></vlan>");
        assert_eq!(native_vlan_payload("102"), "<native-vlan>102</native-vlan>");
    }
}
