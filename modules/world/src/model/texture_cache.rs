use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use std::rc::Rc;

use lumen::video::assets::texture::Texture;

/// Removes `.` components and folds `..` into the preceding directory without
/// touching the file system, so different spellings of a path share one key.
pub fn normalize<P: AsRef<Path>>(path: P) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.as_ref().components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match normalized.components().next_back() {
                Some(Component::Normal(_)) => {
                    normalized.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => normalized.push(".."),
            },
            other => normalized.push(other.as_os_str()),
        }
    }

    normalized
}

/// When unreferenced textures leave the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EvictionPolicy {
    /// Entries live as long as the cache.
    Never,
    /// Entries no model references anymore are dropped whenever the active scene is
    /// replaced or unloaded.
    OnSceneUnload,
}

impl Default for EvictionPolicy {
    fn default() -> Self {
        EvictionPolicy::Never
    }
}

/// Uploaded textures keyed by the path they were decoded from, so repeated
/// references to one image share a single GPU texture.
#[derive(Debug, Default)]
pub struct TextureCache {
    policy: EvictionPolicy,
    textures: HashMap<PathBuf, Rc<Texture>>,
}

impl TextureCache {
    pub fn new(policy: EvictionPolicy) -> Self {
        TextureCache {
            policy,
            textures: HashMap::new(),
        }
    }

    #[inline]
    pub fn policy(&self) -> EvictionPolicy {
        self.policy
    }

    #[inline]
    pub fn set_policy(&mut self, policy: EvictionPolicy) {
        self.policy = policy;
    }

    #[inline]
    pub fn get<P: AsRef<Path>>(&self, path: P) -> Option<Rc<Texture>> {
        self.textures.get(&normalize(path)).cloned()
    }

    #[inline]
    pub fn contains<P: AsRef<Path>>(&self, path: P) -> bool {
        self.textures.contains_key(&normalize(path))
    }

    #[inline]
    pub fn paths(&self) -> impl Iterator<Item = &PathBuf> {
        self.textures.keys()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.textures.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }

    /// Adds the textures staged by a successful load. Paths already cached keep
    /// their current texture.
    pub fn commit<T>(&mut self, staged: T)
    where
        T: IntoIterator<Item = (PathBuf, Rc<Texture>)>,
    {
        for (path, texture) in staged {
            self.textures.entry(normalize(path)).or_insert(texture);
        }
    }

    /// Drops every texture no model holds anymore, returning how many were
    /// released.
    pub fn evict_unreferenced(&mut self) -> usize {
        let len = self.textures.len();
        self.textures.retain(|_, v| Rc::strong_count(v) > 1);

        let evicted = len - self.textures.len();
        if evicted > 0 {
            debug!("Evicted {} unreferenced textures.", evicted);
        }

        evicted
    }

    /// Applies the eviction policy after the active scene went away.
    pub fn on_scene_unload(&mut self) -> usize {
        match self.policy {
            EvictionPolicy::Never => 0,
            EvictionPolicy::OnSceneUnload => self.evict_unreferenced(),
        }
    }

    /// Drops every entry. Textures still used by models stay alive with them.
    pub fn clear(&mut self) {
        self.textures.clear();
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use lumen::video::command::RenderingCommand;

    #[test]
    fn eviction() {
        let command = RenderingCommand::headless();
        let mut cache = TextureCache::new(EvictionPolicy::Never);

        let used = Rc::new(Texture::white(&command).unwrap());
        let unused = Rc::new(Texture::white(&command).unwrap());
        cache.commit(vec![
            (PathBuf::from("used.png"), used.clone()),
            (PathBuf::from("unused.png"), unused),
        ]);

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.on_scene_unload(), 0);
        assert_eq!(command.statistics().alive_textures, 2);

        cache.set_policy(EvictionPolicy::OnSceneUnload);
        assert_eq!(cache.on_scene_unload(), 1);
        assert!(cache.contains("used.png"));
        assert!(!cache.contains("unused.png"));
        assert_eq!(command.statistics().alive_textures, 1);

        drop(used);
        assert_eq!(cache.evict_unreferenced(), 1);
        assert!(cache.is_empty());
        assert_eq!(command.statistics().alive_textures, 0);
    }

    #[test]
    fn normalized_keys() {
        assert_eq!(normalize("a/../tex.png"), PathBuf::from("tex.png"));
        assert_eq!(normalize("./a/./b/../tex.png"), PathBuf::from("a/tex.png"));
        assert_eq!(normalize("../a/tex.png"), PathBuf::from("../a/tex.png"));
        assert_eq!(normalize("/../tex.png"), PathBuf::from("/tex.png"));

        let command = RenderingCommand::headless();
        let mut cache = TextureCache::new(EvictionPolicy::Never);
        let texture = Rc::new(Texture::white(&command).unwrap());
        cache.commit(vec![(PathBuf::from("models/../tex.png"), texture.clone())]);
        cache.commit(vec![(PathBuf::from("tex.png"), texture)]);

        assert_eq!(cache.len(), 1);
        assert!(cache.contains("tex.png"));
        assert!(cache.get("./models/../tex.png").is_some());
    }
}
