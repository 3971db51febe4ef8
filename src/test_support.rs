//! Shared scaffolding for unit tests that need a [`ShellContext`].

use crate::config::Settings;
use crate::console::Style;
use crate::plugin::{PluginRegistry, ShellContext};
use crate::service::{
    Attachment, Case, CaseGroup, CaseValues, Comment, Entitlement, FixtureAttachment,
    FixtureService, Product, ServiceHandle, Snapshot, Solution,
};
use crate::terminal::{FixedMetrics, RunMode, TerminalMetrics};
use std::collections::BTreeMap;
use std::io::Cursor;
use std::path::PathBuf;
use std::rc::Rc;

pub(crate) struct TestShell {
    pub registry: PluginRegistry,
    pub settings: Settings,
    pub metrics: FixedMetrics,
    pub service: ServiceHandle,
}

impl TestShell {
    pub fn new(snapshot: Snapshot) -> Self {
        Self {
            registry: PluginRegistry::new(),
            settings: Settings::default(),
            metrics: FixedMetrics::default(),
            service: Rc::new(FixtureService::new(snapshot)),
        }
    }

    pub fn with_service(service: ServiceHandle) -> Self {
        Self {
            service,
            ..Self::new(Snapshot::default())
        }
    }

    pub fn with_terminal(mut self, rows: usize, cols: usize) -> Self {
        self.metrics = FixedMetrics(TerminalMetrics::new(rows, cols));
        self
    }

    /// Run `body` with `input` as stdin; returns its result and everything written.
    pub fn run<R>(
        &self,
        mode: RunMode,
        input: &str,
        body: impl FnOnce(&mut ShellContext<'_>) -> R,
    ) -> (R, String) {
        let mut input = Cursor::new(input.as_bytes().to_vec());
        let mut out: Vec<u8> = Vec::new();
        let result = {
            let mut ctx = ShellContext {
                registry: &self.registry,
                service: Rc::clone(&self.service),
                settings: &self.settings,
                mode,
                metrics: &self.metrics,
                input: &mut input,
                out: &mut out,
                style: Style::default(),
            };
            body(&mut ctx)
        };
        (result, String::from_utf8_lossy(&out).into_owned())
    }
}

pub(crate) fn temp_dir(label: &str) -> PathBuf {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let dir = std::env::temp_dir().join(format!(
        "support-tool-{label}-{}-{nanos}",
        std::process::id()
    ));
    std::fs::create_dir_all(&dir).expect("create temp dir");
    dir
}

pub(crate) fn case(number: &str, summary: &str) -> Case {
    Case {
        case_number: number.to_string(),
        summary: summary.to_string(),
        status: "Waiting on Red Hat".to_string(),
        severity: "3 (Normal)".to_string(),
        case_type: "Defect / Bug".to_string(),
        product: "Linux".to_string(),
        version: "9.2".to_string(),
        alternate_id: None,
        contact_name: "Pat Example".to_string(),
        owner: "Support Engineer".to_string(),
        group_number: None,
        created_by: "Pat Example".to_string(),
        created_date: "2024-01-02T03:04:05Z".to_string(),
        last_modified_by: "Support Engineer".to_string(),
        last_modified_date: "2024-01-03T03:04:05Z".to_string(),
        description: Some(format!("Description of {summary}")),
        view_uri: Some(format!("https://support.example.com/cases/{number}")),
        comments: Vec::new(),
    }
}

pub(crate) fn solution(id: &str, title: &str, state: &str) -> Solution {
    Solution {
        id: id.to_string(),
        title: title.to_string(),
        state: state.to_string(),
        moderation_state: Some("published".to_string()),
        uri: format!("https://api.support.example.com/rs/solutions/{id}"),
        view_uri: None,
        issue: Some(format!("Issue for {title}")),
        environment: Some("Linux 9".to_string()),
        resolution: Some("Apply the update.".to_string()),
        root_cause: None,
        diagnostic_steps: None,
    }
}

/// Two cases (one with a comment and an attachment), a group, three solutions,
/// two products and one entitlement.
pub(crate) fn sample_snapshot() -> Snapshot {
    let mut commented = case("00000001", "Server fails to boot");
    commented.group_number = Some("42".to_string());
    commented.comments.push(Comment {
        created_by: "Support Engineer".to_string(),
        created_date: "2024-01-03T03:04:05Z".to_string(),
        text: "Please attach a sosreport.".to_string(),
        public: true,
    });
    let quiet = case("00000002", "Slow disk writes");

    let mut attachments = BTreeMap::new();
    attachments.insert(
        "00000001".to_string(),
        vec![FixtureAttachment {
            meta: Attachment {
                uuid: "uuid-1".to_string(),
                file_name: "sosreport.txt".to_string(),
                length: 11,
                created_by: "Pat Example".to_string(),
                created_date: "2024-01-04T00:00:00Z".to_string(),
                description: Some("sosreport".to_string()),
            },
            content: "hello world".to_string(),
        }],
    );

    Snapshot {
        cases: vec![commented, quiet],
        groups: vec![CaseGroup {
            number: "42".to_string(),
            name: "Web Team".to_string(),
        }],
        solutions: vec![
            solution("1001", "Kernel panic after update", "VERIFIED"),
            solution("1002", "Kernel module fails to load", "WIP"),
            solution("1003", "Disk latency spikes", "UNVERIFIED"),
        ],
        attachments,
        products: vec![
            Product {
                name: "Linux".to_string(),
                versions: vec!["8.9".to_string(), "9.2".to_string()],
            },
            Product {
                name: "Virtualization".to_string(),
                versions: vec!["4.4".to_string()],
            },
        ],
        entitlements: vec![Entitlement {
            name: "Premium Server Subscription".to_string(),
            service_level: "PREMIUM".to_string(),
            sla: "24x7".to_string(),
            support_level: "L1-L3".to_string(),
            start_date: "2024-01-01".to_string(),
            end_date: "2025-01-01".to_string(),
        }],
        values: CaseValues::default(),
    }
}
