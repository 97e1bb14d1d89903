use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The topology held by an editing session.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Network {
    #[serde(default)]
    pub devices: Vec<Device>,
    #[serde(default)]
    pub links: Vec<Link>,
    /// Fields this crate does not model, passed through untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    /// Server-assigned identifier; empty until the device is created.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_gateway: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ports: Vec<Port>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Device {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    pub fn with_default_gateway(mut self, gateway: impl Into<String>) -> Self {
        self.default_gateway = Some(gateway.into());
        self
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Port {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One side of a link.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkEndpoint {
    pub device_id: String,
    pub port_id: String,
}

impl LinkEndpoint {
    pub fn new(device_id: impl Into<String>, port_id: impl Into<String>) -> Self {
        Self {
            device_id: device_id.into(),
            port_id: port_id.into(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Link {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub source: LinkEndpoint,
    pub target: LinkEndpoint,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Link {
    pub fn between(source: LinkEndpoint, target: LinkEndpoint) -> Self {
        Self {
            id: String::new(),
            source,
            target,
            extra: Map::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::{Device, Link, LinkEndpoint, Network};

    #[test]
    fn network_keeps_unknown_fields() {
        let network: Network = serde_json::from_value(json!({
            "devices": [
                { "id": "r1", "name": "Router 1", "type": "router", "defaultGateway": "10.0.0.1", "x": 12 }
            ],
            "links": [],
            "revision": 7
        }))
        .expect("must decode");

        assert_eq!(network.devices.len(), 1);
        let device = &network.devices[0];
        assert_eq!(device.kind.as_deref(), Some("router"));
        assert_eq!(device.default_gateway.as_deref(), Some("10.0.0.1"));
        assert_eq!(device.extra.get("x"), Some(&json!(12)));
        assert_eq!(network.extra.get("revision"), Some(&json!(7)));
    }

    #[test]
    fn new_device_serializes_without_id() {
        let body = serde_json::to_value(Device::new("pc").with_kind("host")).expect("must encode");
        assert_eq!(body, json!({ "name": "pc", "type": "host" }));
    }

    #[test]
    fn link_endpoints_use_camel_case() {
        let link = Link::between(LinkEndpoint::new("a", "a0"), LinkEndpoint::new("b", "b1"));
        let body = serde_json::to_value(&link).expect("must encode");
        assert_eq!(
            body,
            json!({
                "source": { "deviceId": "a", "portId": "a0" },
                "target": { "deviceId": "b", "portId": "b1" }
            })
        );
    }

    #[test]
    fn empty_network_body_decodes() {
        let network: Network = serde_json::from_str("{}").expect("must decode");
        assert!(network.devices.is_empty());
        assert!(network.links.is_empty());
    }
}
