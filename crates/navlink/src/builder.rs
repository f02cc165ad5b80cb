//! Jump-link builder orchestration

use super::compact_heightfield::CompactHeightfield;
use super::config::{ActionConfig, LinkBuilderConfig};
use super::context::{BuildContext, TimerCategory};
use super::contour::ContourSet;
use super::edge::{find_edges, Edge};
use super::filter::filter_action_links;
use super::heightfield::Heightfield;
use super::link::{build_edge_links, JumpLink};
use super::sampler::{sample_edge, EdgeSampler};
use navlink_common::{Error, Result};

/// Stage of a build session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuilderState {
    /// No edges extracted yet
    Idle,
    /// Edges are available, no links built
    EdgesFound,
    /// At least one link build ran
    LinksBuilt,
}

/// Builds jump links between the walkable surfaces of a voxelized scene
#[derive(Debug)]
pub struct NavLinkBuilder<'a> {
    solid: &'a Heightfield,
    chf: &'a CompactHeightfield,
    cset: &'a ContourSet,
    config: LinkBuilderConfig,
    edges: Vec<Edge>,
    links: Vec<JumpLink>,
    state: BuilderState,
    context: BuildContext,
}

impl<'a> NavLinkBuilder<'a> {
    /// Creates a builder over borrowed inputs
    pub fn new(
        solid: &'a Heightfield,
        chf: &'a CompactHeightfield,
        cset: &'a ContourSet,
        config: LinkBuilderConfig,
    ) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            solid,
            chf,
            cset,
            config,
            edges: Vec::new(),
            links: Vec::new(),
            state: BuilderState::Idle,
            context: BuildContext::new(),
        })
    }

    /// Extracts the boundary edges of the contour set.
    ///
    /// Returns the number of edges. Fails when edges were already extracted;
    /// call `reset` to start over.
    pub fn find_edges(&mut self) -> Result<usize> {
        if !self.edges.is_empty() {
            return Err(Error::InvalidState(
                "edges already extracted, reset the builder first".to_string(),
            ));
        }

        self.context.start_timer(TimerCategory::FindEdges);
        let result = find_edges(self.cset);
        self.context.stop_timer(TimerCategory::FindEdges);

        match result {
            Ok(edges) => {
                self.context.counters_mut().edges = edges.len();
                self.context
                    .log_info(format!("Found {} boundary edges", edges.len()));
                self.edges = edges;
                self.state = BuilderState::EdgesFound;
                Ok(self.edges.len())
            }
            Err(e) => {
                self.context.log_error(format!("Edge extraction failed: {}", e));
                Err(e)
            }
        }
    }

    /// Builds links of one action for every edge, then filters overlaps.
    ///
    /// Returns the number of links added. Disabled actions add nothing.
    pub fn build_for_all_edges(&mut self, action: &ActionConfig) -> Result<usize> {
        self.build_for_all_edges_with(action, || false)
    }

    /// Same as `build_for_all_edges`, asking `should_cancel` before each edge.
    ///
    /// On cancellation the links built so far are kept and filtered, and
    /// `Error::Cancelled` is returned.
    pub fn build_for_all_edges_with<F>(
        &mut self,
        action: &ActionConfig,
        mut should_cancel: F,
    ) -> Result<usize>
    where
        F: FnMut() -> bool,
    {
        self.require_edges()?;

        if !action.enabled() {
            self.context
                .log_debug(format!("{:?} links disabled, skipping", action.action()));
            return Ok(0);
        }

        self.context.start_timer(TimerCategory::Total);
        let before = self.links.len();
        let total = self.edges.len();
        let mut cancelled = None;

        for index in 0..total {
            if should_cancel() {
                cancelled = Some(index);
                break;
            }
            self.context.set_progress(index + 1, total);

            if let Err(e) = self.add_edge_links(action, index) {
                self.context.stop_timer(TimerCategory::Total);
                return Err(e);
            }
        }

        self.filter_links(action);
        self.state = BuilderState::LinksBuilt;
        self.context.stop_timer(TimerCategory::Total);

        let added = self.links.len() - before;
        if let Some(processed) = cancelled {
            self.context.log_warning(format!(
                "Link build cancelled after {} of {} edges",
                processed, total
            ));
            return Err(Error::Cancelled { processed, total });
        }

        self.context.log_info(format!(
            "Built {} {:?} links over {} edges",
            added,
            action.action(),
            total
        ));
        Ok(added)
    }

    /// Builds the links of a single edge and refilters all links.
    ///
    /// Returns the number of links added.
    pub fn debug_build_edge(&mut self, action: &ActionConfig, edge_index: usize) -> Result<usize> {
        self.require_edges()?;
        self.edge(edge_index)?;

        let added = self.add_edge_links(action, edge_index)?;
        self.filter_links(action);
        self.state = BuilderState::LinksBuilt;
        Ok(added)
    }

    /// Runs the sampling pipeline of an edge without touching the builder
    pub fn sample_edge(&self, action: &ActionConfig, edge: &Edge) -> Result<EdgeSampler> {
        sample_edge(self.chf, self.solid, edge, action, &self.config)
    }

    /// Computes the links of one edge without adding them
    pub fn links_for_edge(
        &self,
        action: &ActionConfig,
        edge_index: usize,
    ) -> Result<Vec<JumpLink>> {
        let sampler = self.sample_edge(action, self.edge(edge_index)?)?;
        Ok(self.edge_links(&sampler, edge_index))
    }

    /// Returns to the idle state, dropping edges, links and context records
    pub fn reset(&mut self) {
        self.edges.clear();
        self.links.clear();
        self.context.reset();
        self.state = BuilderState::Idle;
    }

    /// Extracted edges
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// All links, including filtered ones
    pub fn links(&self) -> &[JumpLink] {
        &self.links
    }

    /// Links that survived filtering
    pub fn valid_links(&self) -> impl Iterator<Item = &JumpLink> {
        self.links.iter().filter(|link| link.is_valid())
    }

    /// Build context with timers, counters and log records
    pub fn context(&self) -> &BuildContext {
        &self.context
    }

    /// Mutable build context, e.g. to change its log level
    pub fn context_mut(&mut self) -> &mut BuildContext {
        &mut self.context
    }

    /// Current stage
    pub fn state(&self) -> BuilderState {
        self.state
    }

    /// Agent and voxel configuration
    pub fn config(&self) -> &LinkBuilderConfig {
        &self.config
    }

    fn require_edges(&self) -> Result<()> {
        if self.state == BuilderState::Idle {
            return Err(Error::InvalidState(
                "find_edges must run before building links".to_string(),
            ));
        }
        Ok(())
    }

    fn edge(&self, index: usize) -> Result<&Edge> {
        self.edges.get(index).ok_or_else(|| {
            Error::InvalidInput(format!(
                "edge index {} out of range ({} edges)",
                index,
                self.edges.len()
            ))
        })
    }

    fn edge_links(&self, sampler: &EdgeSampler, edge_index: usize) -> Vec<JumpLink> {
        let mut links = build_edge_links(sampler, &self.config);
        for link in &mut links {
            link.source_edge = Some(edge_index);
        }
        links
    }

    fn add_edge_links(&mut self, action: &ActionConfig, edge_index: usize) -> Result<usize> {
        let edge = *self.edge(edge_index)?;

        self.context.start_timer(TimerCategory::Sampling);
        let sampled = sample_edge(self.chf, self.solid, &edge, action, &self.config);
        self.context.stop_timer(TimerCategory::Sampling);
        let sampler = sampled?;

        self.context.counters_mut().samples_with_ground += sampler.start.npass + sampler.end.npass;

        self.context.start_timer(TimerCategory::Links);
        let links = self.edge_links(&sampler, edge_index);
        self.context.stop_timer(TimerCategory::Links);

        let added = links.len();
        self.context.counters_mut().links_added += added;
        self.links.extend(links);
        Ok(added)
    }

    /// Filters the links of `action` with its own distance threshold
    fn filter_links(&mut self, action: &ActionConfig) {
        self.context.start_timer(TimerCategory::Filter);
        let filtered = filter_action_links(
            &mut self.links,
            action.action(),
            action.filter_distance_threshold(),
        );
        self.context.stop_timer(TimerCategory::Filter);
        self.context.counters_mut().links_filtered += filtered;
    }
}
