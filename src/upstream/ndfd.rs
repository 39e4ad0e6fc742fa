//! NDFD SOAP client
//!
//! The National Digital Forecast Database speaks SOAP 1.1. Both operations
//! the gateway uses (`LatLonListZipCode` and `NDFDgen`) return their DWML
//! payload as a single escaped string inside the response envelope, so a
//! call here yields the inner XML text ready for the generic mapper.

use quick_xml::escape::escape;
use reqwest::Client;

use super::UpstreamError;
use crate::config::ForecastConfig;
use crate::xml::{self, XmlMember, XmlObject};

const SOAP_NAMESPACE: &str = "uri:DWMLgen";

/// Client for the NDFD SOAP service.
#[derive(Debug, Clone)]
pub struct NdfdClient {
    http: Client,
    endpoint: String,
}

impl NdfdClient {
    /// Creates a client for the SOAP endpoint at `endpoint`.
    pub fn new(http: Client, endpoint: String) -> Self {
        Self { http, endpoint }
    }

    /// Resolves a zip code list to a `latLonList` DWML document.
    pub async fn lat_lon_list_zip_code(&self, zip_code: &str) -> Result<String, UpstreamError> {
        let mut body = String::new();
        push_param(&mut body, "zipCodeList", zip_code);
        self.call("LatLonListZipCode", &body).await
    }

    /// Requests a DWML forecast document for a coordinate pair.
    pub async fn ndfd_gen(
        &self,
        latitude: &str,
        longitude: &str,
        config: &ForecastConfig,
    ) -> Result<String, UpstreamError> {
        let mut body = String::new();
        push_param(&mut body, "latitude", latitude);
        push_param(&mut body, "longitude", longitude);
        push_param(&mut body, "product", &config.product);
        push_param(&mut body, "Unit", &config.unit);
        push_param(&mut body, "startTime", &config.start_time);
        push_param(&mut body, "endTime", &config.end_time);

        body.push_str("<weatherParameters>");
        for parameter in &config.parameters {
            push_param(&mut body, parameter, "1");
        }
        body.push_str("</weatherParameters>");

        self.call("NDFDgen", &body).await
    }

    /// Posts one SOAP request and unwraps the result string.
    async fn call(&self, operation: &str, params: &str) -> Result<String, UpstreamError> {
        let envelope = format!(
            concat!(
                r#"<?xml version="1.0" encoding="UTF-8"?>"#,
                r#"<SOAP-ENV:Envelope xmlns:SOAP-ENV="http://schemas.xmlsoap.org/soap/envelope/">"#,
                "<SOAP-ENV:Body>",
                r#"<ns1:{op} xmlns:ns1="{ns}">{params}</ns1:{op}>"#,
                "</SOAP-ENV:Body>",
                "</SOAP-ENV:Envelope>"
            ),
            op = operation,
            ns = SOAP_NAMESPACE,
            params = params,
        );

        let response = self
            .http
            .post(&self.endpoint)
            .header("Content-Type", "text/xml; charset=utf-8")
            .header("SOAPAction", format!("\"{}#{}\"", SOAP_NAMESPACE, operation))
            .body(envelope)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        // Faults can arrive with a 500 status; inspect the body before the
        // status code so the fault string wins.
        let parsed = xml::parse(&body);
        if let Some(fault) = find_fault(&parsed.root) {
            let message = fault
                .text_at(&["faultstring"])
                .or_else(|| fault.descendant_text())
                .unwrap_or("unspecified fault");
            return Err(UpstreamError::Fault(message.to_string()));
        }
        if !status.is_success() {
            return Err(UpstreamError::Status(status.as_u16()));
        }

        parsed
            .root
            .descendant_text()
            .map(str::to_owned)
            .ok_or_else(|| UpstreamError::Fault("empty SOAP response".to_string()))
    }
}

fn push_param(body: &mut String, name: &str, value: &str) {
    body.push('<');
    body.push_str(name);
    body.push('>');
    body.push_str(&escape(value));
    body.push_str("</");
    body.push_str(name);
    body.push('>');
}

/// Finds a SOAP `Fault` element anywhere in the parsed envelope, under any
/// namespace prefix.
fn find_fault(node: &XmlObject) -> Option<&XmlObject> {
    for (name, member) in &node.children {
        let local = match name.rsplit_once(':') {
            Some((_, local)) => local,
            None => name.as_str(),
        };
        let children: Vec<&XmlObject> = match member {
            XmlMember::One(child) => vec![child],
            XmlMember::Many(children) => children.iter().collect(),
        };
        for child in children {
            if local == "Fault" {
                return Some(child);
            }
            if let Some(fault) = find_fault(child) {
                return Some(fault);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_param_escapes_values() {
        let mut body = String::new();
        push_param(&mut body, "zipCodeList", "12345 <&>");
        assert_eq!(body, "<zipCodeList>12345 &lt;&amp;&gt;</zipCodeList>");
    }

    #[test]
    fn test_find_fault_matches_prefixed_fault() {
        let parsed = xml::parse(
            "<SOAP-ENV:Envelope><SOAP-ENV:Body><SOAP-ENV:Fault>\
             <faultcode>SOAP-ENV:Server</faultcode>\
             <faultstring>zip code out of area</faultstring>\
             </SOAP-ENV:Fault></SOAP-ENV:Body></SOAP-ENV:Envelope>",
        );
        let fault = find_fault(&parsed.root).expect("fault node");
        assert_eq!(fault.text_at(&["faultstring"]), Some("zip code out of area"));
    }

    #[test]
    fn test_find_fault_ignores_ordinary_responses() {
        let parsed = xml::parse(
            "<SOAP-ENV:Envelope><SOAP-ENV:Body><ns1:LatLonListZipCodeResponse>\
             <listLatLonOut>data</listLatLonOut>\
             </ns1:LatLonListZipCodeResponse></SOAP-ENV:Body></SOAP-ENV:Envelope>",
        );
        assert!(find_fault(&parsed.root).is_none());
    }
}
