//! HTTP implementations of the remote collaborators.

use std::sync::Arc;

use futures::future::BoxFuture;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::{
    dao::models::{deserialize_external_id, deserialize_null_as_empty},
    services::collaborators::{CollaboratorError, EntrantFeed, WinnerReport, WinnerReporter},
    state::entrant::Entrant,
};

/// Status value the feed reports inside its body on success.
const FEED_OK_STATUS: u16 = 200;

#[derive(Debug, Deserialize)]
struct FeedEnvelope {
    #[serde(rename = "Status")]
    status: u16,
    #[serde(default)]
    data: Option<Vec<FeedEmployee>>,
}

#[derive(Debug, Deserialize)]
struct FeedEmployee {
    #[serde(rename = "EmpID", default, deserialize_with = "deserialize_external_id")]
    emp_id: Option<String>,
    #[serde(rename = "Name", default, deserialize_with = "deserialize_null_as_empty")]
    name: String,
    #[serde(rename = "City", default, deserialize_with = "deserialize_null_as_empty")]
    city: String,
}

impl From<FeedEmployee> for Entrant {
    fn from(employee: FeedEmployee) -> Self {
        let entrant = Entrant::new(employee.name.trim(), employee.city.trim());
        match employee.emp_id {
            Some(id) => entrant.with_external_id(id),
            None => entrant,
        }
    }
}

#[derive(Debug, Serialize)]
struct SetWinnerBody {
    #[serde(rename = "eventID")]
    event_id: String,
    #[serde(rename = "empId")]
    emp_id: String,
}

impl From<WinnerReport> for SetWinnerBody {
    fn from(report: WinnerReport) -> Self {
        Self {
            event_id: report.session_id,
            emp_id: report.winner_id,
        }
    }
}

fn transport(url: &str, source: reqwest::Error) -> CollaboratorError {
    CollaboratorError::Transport {
        url: url.to_string(),
        source: Box::new(source),
    }
}

/// Employee list served over HTTP as `{Status, data: [{EmpID, Name, City}]}`.
#[derive(Clone)]
pub struct HttpEntrantFeed {
    client: Client,
    url: Arc<str>,
    event_id: Arc<str>,
}

impl HttpEntrantFeed {
    /// Feed reading `url?eventID={event_id}`.
    pub fn new(client: Client, url: impl Into<String>, event_id: impl Into<String>) -> Self {
        Self {
            client,
            url: Arc::from(url.into()),
            event_id: Arc::from(event_id.into()),
        }
    }
}

impl EntrantFeed for HttpEntrantFeed {
    fn fetch(&self) -> BoxFuture<'static, Result<Vec<Entrant>, CollaboratorError>> {
        let client = self.client.clone();
        let url = Arc::clone(&self.url);
        let event_id = Arc::clone(&self.event_id);
        Box::pin(async move {
            let response = client
                .get(url.as_ref())
                .query(&[("eventID", event_id.as_ref())])
                .send()
                .await
                .map_err(|source| transport(&url, source))?;

            if !response.status().is_success() {
                return Err(CollaboratorError::Status {
                    url: url.to_string(),
                    status: response.status().as_u16(),
                });
            }

            let envelope = response
                .json::<FeedEnvelope>()
                .await
                .map_err(|source| transport(&url, source))?;
            parse_envelope(&url, envelope)
        })
    }
}

fn parse_envelope(url: &str, envelope: FeedEnvelope) -> Result<Vec<Entrant>, CollaboratorError> {
    if envelope.status != FEED_OK_STATUS {
        return Err(CollaboratorError::Status {
            url: url.to_string(),
            status: envelope.status,
        });
    }
    let data = envelope.data.ok_or_else(|| CollaboratorError::Payload {
        url: url.to_string(),
        message: "missing `data`".into(),
    })?;

    Ok(data
        .into_iter()
        .filter(|employee| !employee.name.trim().is_empty())
        .map(Entrant::from)
        .collect())
}

/// Winner sink accepting `POST {eventID, empId}`.
#[derive(Clone)]
pub struct HttpWinnerReporter {
    client: Client,
    url: Arc<str>,
}

impl HttpWinnerReporter {
    pub fn new(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: Arc::from(url.into()),
        }
    }
}

impl WinnerReporter for HttpWinnerReporter {
    fn report(&self, report: WinnerReport) -> BoxFuture<'static, Result<(), CollaboratorError>> {
        let client = self.client.clone();
        let url = Arc::clone(&self.url);
        Box::pin(async move {
            let response = client
                .post(url.as_ref())
                .json(&SetWinnerBody::from(report))
                .send()
                .await
                .map_err(|source| transport(&url, source))?;

            if response.status().is_success() {
                Ok(())
            } else {
                Err(CollaboratorError::Status {
                    url: url.to_string(),
                    status: response.status().as_u16(),
                })
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::entrant::SourceTag;

    #[test]
    fn envelope_maps_employees_to_entrants() {
        let envelope: FeedEnvelope = serde_json::from_str(
            r#"{"Status":200,"data":[
                {"EmpID":101,"Name":" Asha ","City":"Pune"},
                {"EmpID":"E-7","Name":"Ravi","City":"Delhi"},
                {"Name":"  ","City":"Pune"}
            ]}"#,
        )
        .unwrap();

        let entrants = parse_envelope("feed", envelope).unwrap();
        assert_eq!(entrants.len(), 2);
        assert_eq!(entrants[0].name, "Asha");
        assert_eq!(entrants[0].external_id.as_deref(), Some("101"));
        assert_eq!(entrants[0].source, SourceTag::Normal);
        assert_eq!(entrants[1].external_id.as_deref(), Some("E-7"));
    }

    #[test]
    fn null_fields_do_not_fail_the_feed() {
        let envelope: FeedEnvelope = serde_json::from_str(
            r#"{"Status":200,"data":[
                {"EmpID":101,"Name":"Asha","City":null},
                {"EmpID":102,"Name":null,"City":"Pune"}
            ]}"#,
        )
        .unwrap();

        let entrants = parse_envelope("feed", envelope).unwrap();
        assert_eq!(entrants.len(), 1);
        assert_eq!(entrants[0].name, "Asha");
        assert_eq!(entrants[0].city, "");
    }

    #[test]
    fn non_ok_body_status_is_a_failure() {
        let envelope: FeedEnvelope =
            serde_json::from_str(r#"{"Status":500,"data":null}"#).unwrap();
        assert!(matches!(
            parse_envelope("feed", envelope),
            Err(CollaboratorError::Status { status: 500, .. })
        ));
    }

    #[test]
    fn report_body_uses_remote_field_names() {
        let body = SetWinnerBody::from(WinnerReport {
            session_id: "4".into(),
            winner_id: "101".into(),
        });
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            serde_json::json!({"eventID": "4", "empId": "101"})
        );
    }
}
