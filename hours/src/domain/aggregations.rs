use std::collections::HashMap;
use std::hash::Hash;

use chrono::{Datelike, Duration, NaiveDate};
use redmine::{find_root_project, TimeEntry};
use serde::Serialize;
use uuid::Uuid;

use super::Connection;

/// Time entries fetched from one connection.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeEntryBatch {
    pub connection_id: Uuid,
    pub data: Vec<TimeEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyHours {
    pub date: NaiveDate,
    pub weekday: String,
    pub hours: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeeklyHours {
    pub week_start: NaiveDate,
    pub hours: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectHours {
    pub project: String,
    pub hours: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConnectionHours {
    pub connection_id: Uuid,
    pub name: String,
    pub hours: f64,
}

/// Sums hours per key, keeping the order in which keys were first seen.
fn sum_by_key<K, V>(items: impl IntoIterator<Item = (K, f64)>, make: impl Fn(K, f64) -> V) -> Vec<V>
where
    K: Eq + Hash + Clone,
{
    let mut index: HashMap<K, usize> = HashMap::new();
    let mut totals: Vec<(K, f64)> = Vec::new();

    for (key, hours) in items {
        match index.get(&key) {
            Some(&i) => totals[i].1 += hours,
            None => {
                index.insert(key.clone(), totals.len());
                totals.push((key, hours));
            }
        }
    }

    totals.into_iter().map(|(k, h)| make(k, h)).collect()
}

fn entries(batches: &[TimeEntryBatch]) -> impl Iterator<Item = &TimeEntry> {
    batches.iter().flat_map(|b| b.data.iter())
}

/// Hours per calendar day, most recent day first.
pub fn hours_by_day(batches: &[TimeEntryBatch]) -> Vec<DailyHours> {
    let mut days = sum_by_key(
        entries(batches).map(|e| (e.spent_on, e.hours)),
        |date, hours| DailyHours {
            date,
            weekday: date.format("%a").to_string(),
            hours,
        },
    );
    days.sort_by(|a, b| b.date.cmp(&a.date));
    days
}

/// The Sunday starting the week that contains `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_sunday()))
}

/// Hours per Sunday-started week, in the order weeks are first encountered.
pub fn hours_by_week(batches: &[TimeEntryBatch]) -> Vec<WeeklyHours> {
    sum_by_key(
        entries(batches).map(|e| (week_start(e.spent_on), e.hours)),
        |week_start, hours| WeeklyHours { week_start, hours },
    )
}

/// Hours per top-level project, highest total first.
///
/// Entries booked on a sub-project count towards its root in the owning connection's cached
/// project tree. Entries whose project is not in the tree, or whose connection is unknown, keep
/// their own project name.
pub fn hours_by_project(batches: &[TimeEntryBatch], connections: &[Connection]) -> Vec<ProjectHours> {
    let named = batches.iter().flat_map(|batch| {
        let tree = connections
            .iter()
            .find(|c| c.id == batch.connection_id)
            .map(Connection::project_tree)
            .unwrap_or_default();

        batch
            .data
            .iter()
            .map(|entry| {
                let name = find_root_project(&tree, entry.project.id)
                    .map(|root| root.name.clone())
                    .unwrap_or_else(|| entry.project.name.clone());
                (name, entry.hours)
            })
            .collect::<Vec<_>>()
    });

    let mut projects = sum_by_key(named, |project, hours| ProjectHours { project, hours });
    projects.sort_by(|a, b| b.hours.total_cmp(&a.hours));
    projects
}

/// Hours per connection, labelled with the connection name.
pub fn hours_by_connection(
    batches: &[TimeEntryBatch],
    connections: &[Connection],
) -> Vec<ConnectionHours> {
    let totals = batches
        .iter()
        .map(|b| (b.connection_id, b.data.iter().fold(0.0, |acc, e| acc + e.hours)));

    sum_by_key(totals, |connection_id, hours| ConnectionHours {
        connection_id,
        name: connections
            .iter()
            .find(|c| c.id == connection_id)
            .map(|c| c.name.clone())
            .unwrap_or_else(|| connection_id.to_string()),
        hours,
    })
}

#[cfg(test)]
mod tests {
    use redmine::{build_project_tree, serialize_project_tree, NamedRef, Project, User};

    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn entry(project_id: u64, project_name: &str, spent_on: &str, hours: f64) -> TimeEntry {
        TimeEntry {
            project: NamedRef {
                id: project_id,
                name: project_name.to_string(),
            },
            spent_on: date(spent_on),
            hours,
            ..Default::default()
        }
    }

    fn batch(connection_id: Uuid, data: Vec<TimeEntry>) -> TimeEntryBatch {
        TimeEntryBatch {
            connection_id,
            data,
        }
    }

    fn project(id: u64, name: &str, parent: Option<u64>) -> Project {
        Project {
            id,
            name: name.to_string(),
            parent: parent.map(|id| NamedRef {
                id,
                name: String::new(),
            }),
            status: redmine::PROJECT_STATUS_ACTIVE,
            ..Default::default()
        }
    }

    fn connection(name: &str, projects: Vec<Project>) -> Connection {
        let mut connection = Connection::from_user(
            name,
            "https://redmine.example.com",
            &User {
                id: 1,
                login: "alice".to_string(),
                ..Default::default()
            },
            "ct:iv".to_string(),
        );
        connection.projects = serialize_project_tree(&build_project_tree(projects)).unwrap();
        connection
    }

    #[test]
    fn by_day_sums_per_date_most_recent_first() {
        let id = Uuid::new_v4();
        let batches = vec![batch(
            id,
            vec![
                entry(1, "A", "2024-01-01", 3.0),
                entry(1, "A", "2024-01-01", 2.0),
                entry(1, "A", "2024-01-02", 1.0),
            ],
        )];

        let days = hours_by_day(&batches);

        assert_eq!(
            days,
            vec![
                DailyHours {
                    date: date("2024-01-02"),
                    weekday: "Tue".to_string(),
                    hours: 1.0,
                },
                DailyHours {
                    date: date("2024-01-01"),
                    weekday: "Mon".to_string(),
                    hours: 5.0,
                },
            ]
        );
    }

    #[test]
    fn by_day_merges_batches_from_different_connections() {
        let batches = vec![
            batch(Uuid::new_v4(), vec![entry(1, "A", "2024-01-03", 1.5)]),
            batch(Uuid::new_v4(), vec![entry(9, "B", "2024-01-03", 2.5)]),
        ];

        let days = hours_by_day(&batches);
        assert_eq!(days.len(), 1);
        assert_eq!(days[0].hours, 4.0);
    }

    #[test]
    fn weeks_start_on_sunday_in_encounter_order() {
        assert_eq!(week_start(date("2024-01-03")), date("2023-12-31"));
        assert_eq!(week_start(date("2023-12-31")), date("2023-12-31"));

        let batches = vec![batch(
            Uuid::new_v4(),
            vec![
                entry(1, "A", "2024-01-09", 1.0),
                entry(1, "A", "2024-01-01", 2.0),
                entry(1, "A", "2024-01-13", 4.0),
                entry(1, "A", "2023-12-31", 8.0),
            ],
        )];

        assert_eq!(
            hours_by_week(&batches),
            vec![
                WeeklyHours {
                    week_start: date("2024-01-07"),
                    hours: 5.0,
                },
                WeeklyHours {
                    week_start: date("2023-12-31"),
                    hours: 10.0,
                },
            ]
        );
    }

    #[test]
    fn by_project_attributes_sub_projects_to_their_root() {
        let conn = connection(
            "Work",
            vec![
                project(1, "Alpha", None),
                project(2, "Alpha Backend", Some(1)),
                project(3, "Beta", None),
            ],
        );
        let batches = vec![batch(
            conn.id,
            vec![
                entry(2, "Alpha Backend", "2024-01-01", 2.0),
                entry(3, "Beta", "2024-01-01", 3.0),
                entry(1, "Alpha", "2024-01-02", 2.0),
                entry(99, "Archived", "2024-01-02", 0.5),
            ],
        )];

        assert_eq!(
            hours_by_project(&batches, &[conn]),
            vec![
                ProjectHours {
                    project: "Alpha".to_string(),
                    hours: 4.0,
                },
                ProjectHours {
                    project: "Beta".to_string(),
                    hours: 3.0,
                },
                ProjectHours {
                    project: "Archived".to_string(),
                    hours: 0.5,
                },
            ]
        );
    }

    #[test]
    fn by_project_keeps_encounter_order_on_ties_and_unknown_connections() {
        let batches = vec![batch(
            Uuid::new_v4(),
            vec![
                entry(5, "Gamma", "2024-01-01", 1.0),
                entry(6, "Delta", "2024-01-01", 1.0),
            ],
        )];

        let projects = hours_by_project(&batches, &[]);
        let names: Vec<_> = projects.iter().map(|p| p.project.as_str()).collect();
        assert_eq!(names, vec!["Gamma", "Delta"]);
    }

    #[test]
    fn by_connection_labels_with_connection_name() {
        let conn = connection("Work", Vec::new());
        let stranger = Uuid::new_v4();
        let batches = vec![
            batch(
                conn.id,
                vec![entry(1, "A", "2024-01-01", 1.0), entry(2, "B", "2024-01-02", 2.0)],
            ),
            batch(stranger, vec![entry(1, "A", "2024-01-01", 0.25)]),
        ];

        assert_eq!(
            hours_by_connection(&batches, &[conn.clone()]),
            vec![
                ConnectionHours {
                    connection_id: conn.id,
                    name: "Work".to_string(),
                    hours: 3.0,
                },
                ConnectionHours {
                    connection_id: stranger,
                    name: stranger.to_string(),
                    hours: 0.25,
                },
            ]
        );
    }

    #[test]
    fn empty_input_produces_empty_output() {
        assert!(hours_by_day(&[]).is_empty());
        assert!(hours_by_week(&[]).is_empty());
        assert!(hours_by_project(&[], &[]).is_empty());
        assert!(hours_by_connection(&[], &[]).is_empty());
    }
}
