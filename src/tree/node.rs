use crate::tree::method_table::MethodTable;
use crate::tree::pattern::Piece;
use crate::Error;
use hyper::Method;
use std::mem;

/// A value registered for a method at a node, along with the pattern it was registered with.
#[derive(Debug)]
pub(crate) struct HandlerEntry<T> {
    pub(crate) value: T,
    pub(crate) pattern: String,
}

/// A placeholder captured while descending the tree, as byte offsets into the request path.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Capture<'n> {
    pub(crate) name: &'n str,
    pub(crate) start: usize,
    pub(crate) end: usize,
    pub(crate) catch_all: bool,
}

/// A vertex of the path tree.
///
/// Static children are looked up by the first byte of their segment, and no two of them share
/// that byte. A parameter node and a catch-all node have an empty segment and carry the
/// placeholder name instead. A catch-all node never has children.
#[derive(Debug)]
pub(crate) struct Node<T> {
    segment: Vec<u8>,
    indices: Vec<u8>,
    children: Vec<Node<T>>,
    param_child: Option<Box<Node<T>>>,
    catch_all_child: Option<Box<Node<T>>>,
    name: String,
    pub(crate) handlers: MethodTable<HandlerEntry<T>>,
}

impl<T> Node<T> {
    pub(crate) fn root() -> Node<T> {
        Node::with_segment(Vec::new())
    }

    fn with_segment(segment: Vec<u8>) -> Node<T> {
        Node {
            segment,
            indices: Vec::new(),
            children: Vec::new(),
            param_child: None,
            catch_all_child: None,
            name: String::new(),
            handlers: MethodTable::default(),
        }
    }

    fn placeholder(name: &str) -> Node<T> {
        let mut node = Node::with_segment(Vec::new());
        node.name = name.to_owned();
        node
    }

    /// Registers `entry` for `method` at the end of `pieces`, starting below this node.
    pub(crate) fn insert(&mut self, pieces: &[Piece], method: Method, entry: HandlerEntry<T>) -> crate::Result<()> {
        let (piece, rest) = match pieces.split_first() {
            Some(split) => split,
            None => return self.add_handler(method, entry),
        };

        match piece {
            Piece::Static(literal) => self.insert_static(literal.as_bytes(), rest, method, entry),
            Piece::Param(name) => {
                let child = self
                    .param_child
                    .get_or_insert_with(|| Box::new(Node::placeholder(name)));
                if child.name != *name {
                    return Err(Error::ConflictingPlaceholder {
                        kind: "parameter",
                        pattern: entry.pattern,
                        existing: child.name.clone(),
                        found: name.clone(),
                    });
                }
                child.insert(rest, method, entry)
            }
            Piece::CatchAll(name) => {
                let child = self
                    .catch_all_child
                    .get_or_insert_with(|| Box::new(Node::placeholder(name)));
                if child.name != *name {
                    return Err(Error::ConflictingPlaceholder {
                        kind: "catch-all",
                        pattern: entry.pattern,
                        existing: child.name.clone(),
                        found: name.clone(),
                    });
                }
                child.insert(rest, method, entry)
            }
        }
    }

    fn insert_static(
        &mut self,
        literal: &[u8],
        rest: &[Piece],
        method: Method,
        entry: HandlerEntry<T>,
    ) -> crate::Result<()> {
        let first = literal[0];

        let idx = match self.indices.iter().position(|&b| b == first) {
            Some(idx) => idx,
            None => {
                self.indices.push(first);
                self.children.push(Node::with_segment(literal.to_vec()));
                let idx = self.children.len() - 1;
                return self.children[idx].insert(rest, method, entry);
            }
        };

        let child = &mut self.children[idx];
        let common = common_prefix_len(&child.segment, literal);
        if common < child.segment.len() {
            child.split_at(common);
        }

        if common < literal.len() {
            child.insert_static(&literal[common..], rest, method, entry)
        } else {
            child.insert(rest, method, entry)
        }
    }

    /// Keeps `segment[..at]` on this node and moves the remainder, with everything hanging off
    /// this node, into a new single child.
    fn split_at(&mut self, at: usize) {
        let tail = Node {
            segment: self.segment.split_off(at),
            indices: mem::take(&mut self.indices),
            children: mem::take(&mut self.children),
            param_child: self.param_child.take(),
            catch_all_child: self.catch_all_child.take(),
            name: String::new(),
            handlers: mem::take(&mut self.handlers),
        };

        self.indices.push(tail.segment[0]);
        self.children.push(tail);
    }

    fn add_handler(&mut self, method: Method, entry: HandlerEntry<T>) -> crate::Result<()> {
        self.handlers
            .insert(method.clone(), entry)
            .map_err(|rejected| Error::DuplicateRoute {
                method,
                pattern: rejected.pattern,
            })
    }

    /// Finds the node which terminates `path[pos..]` and whose handlers are accepted by `accept`,
    /// trying static children, then the parameter child, then the catch-all child, and
    /// backtracking to the next option when a branch dead ends. `pos` is the offset right after
    /// this node's segment.
    ///
    /// Each call descends one level, so the recursion is bounded by the height of the tree.
    pub(crate) fn find<'n, F>(
        &'n self,
        path: &[u8],
        pos: usize,
        captures: &mut Vec<Capture<'n>>,
        accept: &F,
    ) -> Option<&'n Node<T>>
    where
        F: Fn(&MethodTable<HandlerEntry<T>>) -> bool,
    {
        let rest = &path[pos..];

        if rest.is_empty() && accept(&self.handlers) {
            return Some(self);
        }

        if let Some(&first) = rest.first() {
            if let Some(idx) = self.indices.iter().position(|&b| b == first) {
                let child = &self.children[idx];
                if rest.starts_with(&child.segment) {
                    if let Some(found) = child.find(path, pos + child.segment.len(), captures, accept) {
                        return Some(found);
                    }
                }
            }
        }

        if let Some(param) = self.param_child.as_deref() {
            let len = rest.iter().position(|&b| b == b'/').unwrap_or(rest.len());
            if len > 0 {
                captures.push(Capture {
                    name: &param.name,
                    start: pos,
                    end: pos + len,
                    catch_all: false,
                });
                if let Some(found) = param.find(path, pos + len, captures, accept) {
                    return Some(found);
                }
                captures.pop();
            }
        }

        if let Some(catch_all) = self.catch_all_child.as_deref() {
            if accept(&catch_all.handlers) {
                captures.push(Capture {
                    name: &catch_all.name,
                    start: pos,
                    end: path.len(),
                    catch_all: true,
                });
                return Some(catch_all);
            }
        }

        None
    }

    /// Visits every handler entry below this node.
    pub(crate) fn for_each_entry<'n, F>(&'n self, f: &mut F)
    where
        F: FnMut(&'n Method, &'n HandlerEntry<T>),
    {
        for (method, entry) in self.handlers.iter() {
            f(method, entry);
        }
        for child in &self.children {
            child.for_each_entry(f);
        }
        if let Some(param) = self.param_child.as_deref() {
            param.for_each_entry(f);
        }
        if let Some(catch_all) = self.catch_all_child.as_deref() {
            catch_all.for_each_entry(f);
        }
    }

    #[cfg(test)]
    pub(crate) fn segment(&self) -> &[u8] {
        &self.segment
    }

    #[cfg(test)]
    pub(crate) fn children(&self) -> &[Node<T>] {
        &self.children
    }
}

fn common_prefix_len(a: &[u8], b: &[u8]) -> usize {
    a.iter().zip(b.iter()).take_while(|(x, y)| x == y).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::pattern::parse;

    fn insert(root: &mut Node<&'static str>, pattern: &str, value: &'static str) -> crate::Result<()> {
        root.insert(
            &parse(pattern)?,
            Method::GET,
            HandlerEntry {
                value,
                pattern: pattern.to_owned(),
            },
        )
    }

    fn any_handler(handlers: &MethodTable<HandlerEntry<&'static str>>) -> bool {
        !handlers.is_empty()
    }

    #[test]
    fn should_split_nodes_on_common_prefix() {
        let mut root = Node::root();
        insert(&mut root, "/search", "search").unwrap();
        insert(&mut root, "/support", "support").unwrap();
        insert(&mut root, "/", "home").unwrap();

        assert_eq!(root.children().len(), 1);
        let slash = &root.children()[0];
        assert_eq!(slash.segment(), b"/");
        assert_eq!(slash.children().len(), 1);

        let s = &slash.children()[0];
        assert_eq!(s.segment(), b"s");
        let segments: Vec<&[u8]> = s.children().iter().map(|c| c.segment()).collect();
        assert_eq!(segments, vec![&b"earch"[..], &b"upport"[..]]);
        assert!(slash.handlers.get(&Method::GET).is_some());
    }

    #[test]
    fn should_split_inside_multibyte_characters() {
        let mut root = Node::root();
        insert(&mut root, "/café", "a").unwrap();
        insert(&mut root, "/cafè", "b").unwrap();

        let mut captures = Vec::new();
        let found = root.find("/cafè".as_bytes(), 0, &mut captures, &any_handler).unwrap();
        assert_eq!(found.handlers.get(&Method::GET).unwrap().value, "b");
    }

    #[test]
    fn should_reject_duplicates_and_conflicting_names() {
        let mut root = Node::root();
        insert(&mut root, "/users/:id", "user").unwrap();
        insert(&mut root, "/files/*path", "files").unwrap();

        assert!(matches!(
            insert(&mut root, "/users/:id", "again"),
            Err(Error::DuplicateRoute { .. })
        ));
        assert!(matches!(
            insert(&mut root, "/users/:name/books", "books"),
            Err(Error::ConflictingPlaceholder { kind: "parameter", .. })
        ));
        assert!(matches!(
            insert(&mut root, "/files/*rest", "rest"),
            Err(Error::ConflictingPlaceholder { kind: "catch-all", .. })
        ));
    }

    #[test]
    fn should_backtrack_from_dead_ends() {
        let mut root = Node::root();
        insert(&mut root, "/a/b/c", "static").unwrap();
        insert(&mut root, "/a/:x/d", "param").unwrap();

        let mut captures = Vec::new();
        let found = root.find(b"/a/b/d", 0, &mut captures, &any_handler).unwrap();
        assert_eq!(found.handlers.get(&Method::GET).unwrap().value, "param");
        assert_eq!(captures.len(), 1);
        assert_eq!(captures[0].name, "x");
        assert_eq!((captures[0].start, captures[0].end), (3, 4));
    }
}
