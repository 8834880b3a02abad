//! Decodes the binary Build Event Protocol stream `bazel build` wrote to
//! the temp file `bazel::driver` allocated, and flattens the named-file-set
//! DAG it describes into the transitive output files of one output group.

use std::collections::{HashMap, HashSet};

use anyhow::{Context, Result};
use log::trace;
use prost::bytes::{Buf, Bytes};
use prost::Message;
use url::Url;

use crate::error::DriverError;

/// Generated from `proto/build_event_stream.proto` by `build.rs`.
pub mod proto {
    include!(concat!(env!("OUT_DIR"), "/build_event_stream.rs"));
}

use proto::build_event::Payload;
use proto::build_event_id::Id as BuildEventIdKind;
use proto::file::File as FileVariant;
use proto::BuildEvent;

/// Everything recovered from the stream before the DAG is flattened.
#[derive(Default)]
struct ConsumerState {
    root_set_ids: Vec<String>,
    set_to_files: HashMap<String, Vec<String>>,
    set_to_children: HashMap<String, Vec<String>>,
}

/// Decodes the event stream and returns the absolute file paths reachable
/// from the roots of `output_group` across every completed target.
pub fn extract_output_files(bytes: &[u8], output_group: &str) -> Result<Vec<String>> {
    let state = consume(bytes, output_group)?;
    Ok(flatten(&state))
}

fn consume(bytes: &[u8], output_group: &str) -> Result<ConsumerState> {
    let mut state = ConsumerState::default();
    let mut buf = Bytes::copy_from_slice(bytes);

    while buf.has_remaining() {
        let event = BuildEvent::decode_length_delimited(&mut buf)
            .map_err(|e| DriverError::Parse(format!("malformed build event in stream: {}", e)))?;

        match event.payload {
            Some(Payload::Completed(completed)) => {
                if !completed.success {
                    let label = event
                        .id
                        .and_then(|id| id.id)
                        .and_then(|id| match id {
                            BuildEventIdKind::TargetCompleted(t) => Some(t.label),
                            _ => None,
                        })
                        .unwrap_or_else(|| "<unknown target>".to_owned());
                    return Err(DriverError::BuildSystem(format!("target {} did not build successfully", label)).into());
                }

                for group in completed.output_group {
                    if group.name != output_group {
                        continue;
                    }
                    for set_id in group.file_sets {
                        trace!("bazel::event_stream: root file set {}", set_id.id);
                        state.root_set_ids.push(set_id.id);
                    }
                }
            }
            Some(Payload::NamedSetOfFiles(named_set)) => {
                let set_id = match event.id.and_then(|id| id.id) {
                    Some(BuildEventIdKind::NamedSet(id)) => id.id,
                    _ => return Err(DriverError::Parse("named_set_of_files event is missing its id".to_owned()).into()),
                };

                let mut files = Vec::with_capacity(named_set.files.len());
                for file in named_set.files {
                    let uri = match file.file {
                        Some(FileVariant::Uri(uri)) => uri,
                        Some(FileVariant::Contents(_)) => {
                            return Err(DriverError::Parse(format!(
                                "file {} in set {} is inlined, expected a file:// uri",
                                file.name, set_id
                            ))
                            .into())
                        }
                        None => {
                            return Err(DriverError::Parse(format!("file {} in set {} has no payload", file.name, set_id))
                                .into())
                        }
                    };
                    files.push(file_uri_to_path(&uri)?);
                }

                let children = named_set.file_sets.into_iter().map(|s| s.id).collect();
                state.set_to_files.insert(set_id.clone(), files);
                state.set_to_children.insert(set_id, children);
            }
            None => {}
        }

        if event.last_message {
            break;
        }
    }

    Ok(state)
}

fn file_uri_to_path(uri: &str) -> Result<String> {
    let parsed = Url::parse(uri).with_context(|| format!("malformed file uri {:?}", uri))?;
    if parsed.scheme() != "file" {
        return Err(DriverError::Parse(format!(
            "unsupported uri scheme {:?} in {:?}, expected file://",
            parsed.scheme(),
            uri
        ))
        .into());
    }
    parsed
        .to_file_path()
        .map(|p| p.to_string_lossy().into_owned())
        .map_err(|_| DriverError::Parse(format!("could not turn {:?} into a file path", uri)).into())
}

/// Depth-first flatten of the file-set DAG from every root, memoizing
/// visited set ids so diamonds converge and cycles (which cannot occur per
/// the build system's own invariant, but which this traversal tolerates
/// regardless) cannot loop forever.
fn flatten(state: &ConsumerState) -> Vec<String> {
    let mut visited: HashSet<&str> = HashSet::new();
    let mut out = Vec::new();

    let mut stack: Vec<&str> = state.root_set_ids.iter().map(String::as_str).collect();
    while let Some(set_id) = stack.pop() {
        if !visited.insert(set_id) {
            continue;
        }
        if let Some(files) = state.set_to_files.get(set_id) {
            out.extend(files.iter().cloned());
        }
        if let Some(children) = state.set_to_children.get(set_id) {
            stack.extend(children.iter().map(String::as_str));
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use proto::build_event_id::{NamedSetOfFilesId, TargetCompletedId};
    use proto::{BuildEventId, File, NamedSetOfFiles, OutputGroup, TargetComplete};

    fn set_event(id: &str, files: Vec<&str>, children: Vec<&str>, last: bool) -> BuildEvent {
        BuildEvent {
            id: Some(BuildEventId {
                id: Some(BuildEventIdKind::NamedSet(NamedSetOfFilesId { id: id.to_owned() })),
            }),
            payload: Some(Payload::NamedSetOfFiles(NamedSetOfFiles {
                files: files
                    .into_iter()
                    .map(|uri| File {
                        path_prefix: vec![],
                        name: uri.rsplit('/').next().unwrap_or(uri).to_owned(),
                        file: Some(FileVariant::Uri(uri.to_owned())),
                    })
                    .collect(),
                file_sets: children.into_iter().map(|c| NamedSetOfFilesId { id: c.to_owned() }).collect(),
            })),
            last_message: last,
        }
    }

    fn completed_event(label: &str, success: bool, group: &str, set_ids: Vec<&str>, last: bool) -> BuildEvent {
        BuildEvent {
            id: Some(BuildEventId {
                id: Some(BuildEventIdKind::TargetCompleted(TargetCompletedId { label: label.to_owned() })),
            }),
            payload: Some(Payload::Completed(TargetComplete {
                success,
                output_group: vec![OutputGroup {
                    name: group.to_owned(),
                    file_sets: set_ids.into_iter().map(|id| NamedSetOfFilesId { id: id.to_owned() }).collect(),
                }],
            })),
            last_message: last,
        }
    }

    fn encode_stream(events: &[BuildEvent]) -> Vec<u8> {
        let mut buf = Vec::new();
        for event in events {
            event.encode_length_delimited(&mut buf).unwrap();
        }
        buf
    }

    #[test]
    fn flattens_diamond_shaped_file_sets() {
        let events = vec![
            set_event("leaf", vec!["file:///root/leaf.go"], vec![], false),
            set_event("mid_a", vec![], vec!["leaf"], false),
            set_event("mid_b", vec![], vec!["leaf"], false),
            set_event("top", vec!["file:///root/top.go"], vec!["mid_a", "mid_b"], false),
            completed_event("//:hello", true, "gopackagesdriver_data", vec!["top"], true),
        ];
        let bytes = encode_stream(&events);

        let files = extract_output_files(&bytes, "gopackagesdriver_data").unwrap();
        assert_eq!(files.len(), 2);
        assert!(files.contains(&"/root/leaf.go".to_owned()));
        assert!(files.contains(&"/root/top.go".to_owned()));
    }

    #[test]
    fn fails_on_unsuccessful_target() {
        let events = vec![completed_event("//:broken", false, "gopackagesdriver_data", vec![], true)];
        let bytes = encode_stream(&events);
        let err = extract_output_files(&bytes, "gopackagesdriver_data").unwrap_err();
        assert!(err.to_string().contains("//:broken"));
    }

    #[test]
    fn ignores_other_output_groups() {
        let events = vec![
            set_event("s", vec!["file:///root/s.go"], vec![], false),
            completed_event("//:hello", true, "some_other_group", vec!["s"], true),
        ];
        let bytes = encode_stream(&events);
        let files = extract_output_files(&bytes, "gopackagesdriver_data").unwrap();
        assert!(files.is_empty());
    }
}
