//! Or-scope frames.
//!
//! While a scope is open, registered conditions are routed into the current
//! frame instead of the real lists. Scopes nest; closing the outermost frame
//! reflects the whole tree into each target list as one parenthesized clause
//! joined with `or`. Inside a frame an and-part can be opened so that a run of
//! conditions stays joined with `and` within the or-connected sequence.

use std::collections::BTreeMap;

use crate::error::{ClauseError, ClauseResult};
use crate::fragment::QueryClause;

#[derive(Debug, Default)]
struct OrScopeFrame {
    parent: Option<usize>,
    children: Vec<usize>,
    where_list: Vec<QueryClause>,
    base_inline_list: Vec<QueryClause>,
    join_inline_map: BTreeMap<String, Vec<QueryClause>>,
    join_on_map: BTreeMap<String, Vec<QueryClause>>,
    and_part_active: bool,
}

/// The clauses an or-scope produced, one per touched target.
#[derive(Debug, Default)]
pub(crate) struct OrScopeReflection {
    pub where_clause: Option<QueryClause>,
    pub base_inline: Option<QueryClause>,
    pub join_inline: Vec<(String, QueryClause)>,
    pub join_on: Vec<(String, QueryClause)>,
}

/// Which of a frame's condition lists a reflection pass reads.
#[derive(Clone, Copy)]
enum ReflectTarget<'a> {
    WhereList,
    BaseInlineList,
    JoinInline(&'a str),
    JoinOn(&'a str),
}

impl ReflectTarget<'_> {
    fn list_of<'f>(self, frame: &'f OrScopeFrame) -> Option<&'f Vec<QueryClause>> {
        match self {
            Self::WhereList => Some(&frame.where_list),
            Self::BaseInlineList => Some(&frame.base_inline_list),
            Self::JoinInline(alias_name) => frame.join_inline_map.get(alias_name),
            Self::JoinOn(alias_name) => frame.join_on_map.get(alias_name),
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct OrScopeState {
    frames: Vec<OrScopeFrame>,
    current: Option<usize>,
    and_part_counter: usize,
}

impl OrScopeState {
    pub fn is_active(&self) -> bool {
        self.current.is_some()
    }

    pub fn is_and_part_active(&self) -> bool {
        self.current
            .map(|index| self.frames[index].and_part_active)
            .unwrap_or(false)
    }

    /// Open a frame, nested under the current one if a scope is active.
    pub fn begin(&mut self) {
        let parent = self.current;
        let index = self.frames.len();
        self.frames.push(OrScopeFrame {
            parent,
            ..OrScopeFrame::default()
        });
        if let Some(parent_index) = parent {
            self.frames[parent_index].children.push(index);
        }
        self.current = Some(index);
    }

    /// Close the current frame. Closing the outermost one reflects the tree
    /// and resets the state.
    pub fn end(&mut self) -> ClauseResult<Option<OrScopeReflection>> {
        let index = self.current.ok_or_else(|| {
            ClauseError::precondition("endOrScope() without a beginning or-scope")
        })?;
        if self.frames[index].and_part_active {
            return Err(ClauseError::precondition(
                "endOrScope() with an or-scope and-part left open",
            ));
        }
        match self.frames[index].parent {
            Some(parent_index) => {
                self.current = Some(parent_index);
                Ok(None)
            }
            None => {
                let reflection = self.reflect(index);
                self.frames.clear();
                self.current = None;
                self.and_part_counter = 0;
                Ok(Some(reflection))
            }
        }
    }

    pub fn begin_and_part(&mut self) -> ClauseResult<()> {
        let index = self.current.ok_or_else(|| {
            ClauseError::precondition("beginOrScopeAndPart() without an active or-scope")
        })?;
        if self.frames[index].and_part_active {
            return Err(ClauseError::precondition(
                "beginOrScopeAndPart() while an and-part is already open",
            ));
        }
        self.and_part_counter += 1;
        self.frames[index].and_part_active = true;
        Ok(())
    }

    pub fn end_and_part(&mut self) -> ClauseResult<()> {
        let index = self.current.ok_or_else(|| {
            ClauseError::precondition("endOrScopeAndPart() without an active or-scope")
        })?;
        if !self.frames[index].and_part_active {
            return Err(ClauseError::precondition(
                "endOrScopeAndPart() without a beginning and-part",
            ));
        }
        self.frames[index].and_part_active = false;
        Ok(())
    }

    // ==================== Routing ====================

    fn wrap(&self, index: usize, clause: QueryClause) -> QueryClause {
        if self.frames[index].and_part_active {
            QueryClause::AndPart {
                group: self.and_part_counter,
                inner: Box::new(clause),
            }
        } else {
            clause
        }
    }

    pub fn push_where(&mut self, clause: QueryClause) {
        if let Some(index) = self.current {
            let wrapped = self.wrap(index, clause);
            self.frames[index].where_list.push(wrapped);
        }
    }

    pub fn push_base_inline(&mut self, clause: QueryClause) {
        if let Some(index) = self.current {
            let wrapped = self.wrap(index, clause);
            self.frames[index].base_inline_list.push(wrapped);
        }
    }

    pub fn push_join_inline(&mut self, alias_name: &str, clause: QueryClause) {
        if let Some(index) = self.current {
            let wrapped = self.wrap(index, clause);
            self.frames[index]
                .join_inline_map
                .entry(alias_name.to_string())
                .or_default()
                .push(wrapped);
        }
    }

    pub fn push_join_on(&mut self, alias_name: &str, clause: QueryClause) {
        if let Some(index) = self.current {
            let wrapped = self.wrap(index, clause);
            self.frames[index]
                .join_on_map
                .entry(alias_name.to_string())
                .or_default()
                .push(wrapped);
        }
    }

    // ==================== Reflection ====================

    fn reflect(&self, root: usize) -> OrScopeReflection {
        let mut reflection = OrScopeReflection::default();
        reflection.where_clause = self.reflect_target(root, ReflectTarget::WhereList);
        reflection.base_inline = self.reflect_target(root, ReflectTarget::BaseInlineList);
        for alias_name in self.collect_aliases(root, |frame| &frame.join_inline_map) {
            if let Some(clause) = self.reflect_target(root, ReflectTarget::JoinInline(&alias_name))
            {
                reflection.join_inline.push((alias_name, clause));
            }
        }
        for alias_name in self.collect_aliases(root, |frame| &frame.join_on_map) {
            if let Some(clause) = self.reflect_target(root, ReflectTarget::JoinOn(&alias_name)) {
                reflection.join_on.push((alias_name, clause));
            }
        }
        reflection
    }

    fn collect_aliases(
        &self,
        root: usize,
        map_of: fn(&OrScopeFrame) -> &BTreeMap<String, Vec<QueryClause>>,
    ) -> Vec<String> {
        let mut aliases = Vec::new();
        let mut stack = vec![root];
        while let Some(index) = stack.pop() {
            let frame = &self.frames[index];
            for alias_name in map_of(frame).keys() {
                if !aliases.contains(alias_name) {
                    aliases.push(alias_name.clone());
                }
            }
            stack.extend(frame.children.iter().copied());
        }
        aliases.sort();
        aliases
    }

    fn reflect_target(&self, root: usize, target: ReflectTarget<'_>) -> Option<QueryClause> {
        let parts = self.render_frame(root, target);
        match parts.len() {
            0 => None,
            1 => Some(QueryClause::raw(parts.into_iter().next().unwrap_or_default())),
            _ => Some(QueryClause::raw(format!("({})", parts.join(" or ")))),
        }
    }

    fn render_frame(&self, index: usize, target: ReflectTarget<'_>) -> Vec<String> {
        let frame = &self.frames[index];
        let mut parts = Vec::new();
        let mut group: Option<usize> = None;
        let mut members: Vec<String> = Vec::new();
        let flush = |group_members: &mut Vec<String>, parts: &mut Vec<String>| {
            match group_members.len() {
                0 => {}
                1 => parts.push(group_members.remove(0)),
                _ => parts.push(format!("({})", group_members.join(" and "))),
            }
            group_members.clear();
        };
        if let Some(own) = target.list_of(frame) {
            for entry in own {
                match entry.and_part_group() {
                    Some(id) if group == Some(id) => members.push(entry.render()),
                    Some(id) => {
                        flush(&mut members, &mut parts);
                        group = Some(id);
                        members.push(entry.render());
                    }
                    None => {
                        flush(&mut members, &mut parts);
                        group = None;
                        parts.push(entry.render());
                    }
                }
            }
        }
        flush(&mut members, &mut parts);
        for child in &frame.children {
            let child_parts = self.render_frame(*child, target);
            match child_parts.len() {
                0 => {}
                1 => parts.extend(child_parts),
                _ => parts.push(format!("({})", child_parts.join(" or "))),
            }
        }
        parts
    }
}
