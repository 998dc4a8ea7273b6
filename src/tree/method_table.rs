use hyper::Method;
use std::collections::HashMap;

static STANDARD_METHODS: [Method; 9] = [
    Method::GET,
    Method::POST,
    Method::PUT,
    Method::PATCH,
    Method::DELETE,
    Method::HEAD,
    Method::OPTIONS,
    Method::CONNECT,
    Method::TRACE,
];

fn standard_slot(method: &Method) -> Option<usize> {
    match method.as_str() {
        "GET" => Some(0),
        "POST" => Some(1),
        "PUT" => Some(2),
        "PATCH" => Some(3),
        "DELETE" => Some(4),
        "HEAD" => Some(5),
        "OPTIONS" => Some(6),
        "CONNECT" => Some(7),
        "TRACE" => Some(8),
        _ => None,
    }
}

/// Values keyed by HTTP method: fixed slots for the standard methods, a map for extension methods.
#[derive(Debug)]
pub(crate) struct MethodTable<V> {
    standard: [Option<V>; 9],
    extension: HashMap<Method, V>,
}

impl<V> Default for MethodTable<V> {
    fn default() -> Self {
        MethodTable {
            standard: Default::default(),
            extension: HashMap::new(),
        }
    }
}

impl<V> MethodTable<V> {
    pub(crate) fn get(&self, method: &Method) -> Option<&V> {
        match standard_slot(method) {
            Some(slot) => self.standard[slot].as_ref(),
            None => self.extension.get(method),
        }
    }

    /// Stores the value unless one is already registered for the method, in which case the
    /// rejected value is handed back.
    pub(crate) fn insert(&mut self, method: Method, value: V) -> Result<(), V> {
        let entry = match standard_slot(&method) {
            Some(slot) => &mut self.standard[slot],
            None => {
                if self.extension.contains_key(&method) {
                    return Err(value);
                }
                self.extension.insert(method, value);
                return Ok(());
            }
        };

        if entry.is_some() {
            return Err(value);
        }
        *entry = Some(value);
        Ok(())
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.standard.iter().all(Option::is_none) && self.extension.is_empty()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (&Method, &V)> {
        STANDARD_METHODS
            .iter()
            .zip(self.standard.iter())
            .filter_map(|(method, value)| value.as_ref().map(|value| (method, value)))
            .chain(self.extension.iter())
    }

    /// The registered methods sorted by name.
    pub(crate) fn allowed(&self) -> Vec<Method> {
        let mut methods: Vec<Method> = self.iter().map(|(method, _)| method.clone()).collect();
        methods.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        methods
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_reject_duplicate_methods() {
        let mut table = MethodTable::default();
        assert!(table.insert(Method::GET, 1).is_ok());
        assert_eq!(table.insert(Method::GET, 2), Err(2));
        assert_eq!(table.get(&Method::GET), Some(&1));

        let purge = Method::from_bytes(b"PURGE").unwrap();
        assert!(table.insert(purge.clone(), 3).is_ok());
        assert_eq!(table.insert(purge.clone(), 4), Err(4));
        assert_eq!(table.get(&purge), Some(&3));
    }

    #[test]
    fn should_list_allowed_methods_sorted() {
        let mut table = MethodTable::default();
        assert!(table.is_empty());
        table.insert(Method::POST, ()).unwrap();
        table.insert(Method::from_bytes(b"LINK").unwrap(), ()).unwrap();
        table.insert(Method::GET, ()).unwrap();

        let allowed = table.allowed();
        let names: Vec<&str> = allowed.iter().map(Method::as_str).collect();
        assert_eq!(names, vec!["GET", "LINK", "POST"]);
        assert!(!table.is_empty());
    }
}
