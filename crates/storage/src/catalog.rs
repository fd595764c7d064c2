use shared::{
    domain::{ClassConfig, Roster, SavedClasses, TopicList},
    error::{JigsawError, Result},
};
use tracing::{info, warn};

use crate::ClassStore;

/// In-memory view of the saved classes that writes through to a store.
///
/// Every edit persists the whole mapping; when the store refuses, the edit is
/// rolled back and the store's message is returned unchanged.
pub struct ClassCatalog<S> {
    store: S,
    classes: SavedClasses,
}

impl<S: ClassStore> ClassCatalog<S> {
    pub async fn open(store: S) -> Result<Self> {
        let classes = store.load().await.map_err(persistence)?;
        info!(classes = classes.len(), "class catalog loaded");
        Ok(Self { store, classes })
    }

    pub fn names(&self) -> Vec<&str> {
        self.classes.keys().map(String::as_str).collect()
    }

    pub fn get(&self, name: &str) -> Option<&ClassConfig> {
        self.classes.get(name.trim())
    }

    pub fn classes(&self) -> &SavedClasses {
        &self.classes
    }

    /// Saves `config` under `name`, replacing an existing class of that name.
    ///
    /// Names and topics are cleaned the same way as at session setup.
    pub async fn upsert(&mut self, name: &str, config: ClassConfig) -> Result<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(JigsawError::configuration("a class needs a name"));
        }
        let students = Roster::from_names(&config.students);
        let topics = TopicList::from_names(&config.topics);
        if students.is_empty() {
            return Err(JigsawError::configuration(
                "a class needs at least one student",
            ));
        }
        if topics.is_empty() {
            return Err(JigsawError::configuration("a class needs at least one topic"));
        }
        config.durations().validate()?;

        let config = ClassConfig::new(&students, &topics, config.durations());
        let previous = self.classes.insert(name.to_string(), config);
        if let Err(err) = self.store.save(&self.classes).await {
            match previous {
                Some(previous) => self.classes.insert(name.to_string(), previous),
                None => self.classes.remove(name),
            };
            warn!(class = name, error = %format!("{err:#}"), "saving class failed, change rolled back");
            return Err(persistence(err));
        }

        info!(class = name, students = students.len(), topics = topics.len(), "class saved");
        Ok(())
    }

    pub async fn remove(&mut self, name: &str) -> Result<ClassConfig> {
        let name = name.trim();
        let Some(config) = self.classes.remove(name) else {
            return Err(JigsawError::invalid_operation(format!(
                "no saved class named '{name}'"
            )));
        };

        if let Err(err) = self.store.save(&self.classes).await {
            self.classes.insert(name.to_string(), config);
            warn!(class = name, error = %format!("{err:#}"), "deleting class failed, change rolled back");
            return Err(persistence(err));
        }

        info!(class = name, "class deleted");
        Ok(config)
    }
}

fn persistence(err: anyhow::Error) -> JigsawError {
    JigsawError::persistence(format!("{err:#}"))
}
