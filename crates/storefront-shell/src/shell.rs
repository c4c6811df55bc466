//! # Navigation Shell
//!
//! Drives navigation: match the path, guard it against the current session,
//! load the target views and render them inside the failure boundary.
//!
//! ## Event Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  navigate(path) ──► ticket += 1                                         │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  RouteTable::match_path ──► guard ──► Redirect ──► navigate(target)     │
//! │                               │                                         │
//! │                               ▼ RenderView                              │
//! │  one Region per view ──► DeferredLoader::load                           │
//! │        │                   ├── Ready   ──► render now                   │
//! │        │                   └── Pending ──► placeholder + waiter task    │
//! │        │                                        │                       │
//! │        │                                        ▼                       │
//! │        │                     mpsc: RegionResolved { ticket, region }    │
//! │        ▼                                        │                       │
//! │  pump().await ◄─────────────────────────────────┘                       │
//! │        ├── stale ticket ──► discarded                                   │
//! │        ├── re-guard against the session as it is NOW                    │
//! │        └── Ready ──► render │ Failed ──► retryable region + warning     │
//! │                                                                         │
//! │  session watch ──► pump().await ──► re-guard the active route           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Runtime
//! Navigation spawns tokio tasks. Call it from within a tokio runtime; the
//! console app uses a current-thread runtime so events apply serially.

use std::fmt;
use std::sync::Arc;

use storefront_core::guard::guard;
use storefront_core::policy::return_target;
use storefront_core::provider::NESTING_ORDER;
use storefront_core::{
    AccessClass, Identity, ProviderStack, RedirectTargets, RenderDirective, RouteParams,
    RouteTable, ViewId, ViewTarget, ViewerState,
};
use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info, warn};

use crate::cart::CartScope;
use crate::config::StorefrontConfig;
use crate::containment::RecoveryView;
use crate::error::{LoadFailure, ShellResult};
use crate::loader::{DeferredLoader, LoadResult, Placeholder};
use crate::notify::{Notification, Notifier, SESSION_ENDED, SIGN_IN_REQUIRED};
use crate::providers::Providers;
use crate::registry::ViewRegistry;
use crate::session::SessionStore;
use crate::theme::ThemeScope;
use crate::view::{Rendered, ViewContext, ViewHandle};

// =============================================================================
// Navigation Tickets & Events
// =============================================================================

/// Identifies one navigation. Completions carrying an older ticket are stale.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct NavTicket(u64);

impl NavTicket {
    fn next(self) -> Self {
        NavTicket(self.0 + 1)
    }
}

impl fmt::Display for NavTicket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Asynchronous completions delivered to the shell.
#[derive(Debug, Clone)]
pub enum ShellEvent {
    /// The fetch behind `region` settled (ready or failed).
    RegionResolved {
        ticket: NavTicket,
        region: usize,
        view: ViewId,
    },
}

// =============================================================================
// Screen Model
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegionState {
    Loading,
    Ready(Rendered),
    Failed(LoadFailure),
}

/// One independently loaded part of a screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    pub view: ViewId,
    pub placeholder: Placeholder,
    pub state: RegionState,
}

impl Region {
    pub fn is_loading(&self) -> bool {
        matches!(self.state, RegionState::Loading)
    }
}

/// A rendered route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteScreen {
    /// Location as requested, query string included.
    pub path: String,
    /// Name of the matched route entry.
    pub route: String,
    pub access: AccessClass,
    pub params: RouteParams,
    pub regions: Vec<Region>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Screen {
    /// Nothing navigated yet.
    #[default]
    Blank,
    Route(RouteScreen),
    Recovery(RecoveryView),
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Screen::Blank => writeln!(f, "(nothing to show)"),
            Screen::Route(screen) => {
                writeln!(f, "== {} ({}) ==", screen.route, screen.path)?;
                for (index, region) in screen.regions.iter().enumerate() {
                    match &region.state {
                        RegionState::Loading => {
                            writeln!(f, "[{}] {}: {}", index, region.view, region.placeholder)?
                        }
                        RegionState::Ready(rendered) => {
                            writeln!(f, "[{}] {}", index, rendered.title)?;
                            for line in &rendered.lines {
                                writeln!(f, "    {}", line)?;
                            }
                        }
                        RegionState::Failed(failure) => {
                            writeln!(f, "[{}] {} (retry {})", index, failure, index)?
                        }
                    }
                }
                Ok(())
            }
            Screen::Recovery(recovery) => {
                writeln!(f, "== {} ==", recovery.heading)?;
                writeln!(f, "{}", recovery.message)?;
                writeln!(f, "[{}]", recovery.action.label())
            }
        }
    }
}

// =============================================================================
// Shell
// =============================================================================

/// The routing scope and everything it drives.
pub struct Shell {
    table: Arc<RouteTable>,
    registry: ViewRegistry,
    config: StorefrontConfig,
    targets: RedirectTargets,
    stack: ProviderStack,
    providers: Providers,
    loader: DeferredLoader,
    notifier: Arc<dyn Notifier>,
    session_rx: watch::Receiver<ViewerState>,
    events_tx: mpsc::UnboundedSender<ShellEvent>,
    events_rx: mpsc::UnboundedReceiver<ShellEvent>,
    ticket: NavTicket,
    screen: Screen,
}

impl Shell {
    /// Validates the declarations and mounts the provider scopes.
    ///
    /// ## Errors
    /// Every declaration problem is fatal here: invalid config values,
    /// redirect targets that would not render, unregistered views, and a
    /// provider nesting that deviates from the fixed order.
    pub fn new(
        table: RouteTable,
        registry: ViewRegistry,
        config: StorefrontConfig,
        notifier: Arc<dyn Notifier>,
    ) -> ShellResult<Self> {
        config.validate()?;

        let targets = config.redirect_targets();
        table.validate_redirects(&targets)?;
        registry.verify(&table)?;

        let stack = ProviderStack::compose(&NESTING_ORDER)?;
        let providers = Providers::mount(&stack, &config)?;
        let session_rx = providers.session().subscribe();
        let (events_tx, events_rx) = mpsc::unbounded_channel();

        info!(
            routes = table.entries().len(),
            views = registry.len(),
            sign_in = %targets.sign_in,
            landing = %targets.landing,
            "Storefront shell ready"
        );

        Ok(Shell {
            loader: DeferredLoader::new(config.fetch_timeout()),
            table: Arc::new(table),
            registry,
            config,
            targets,
            stack,
            providers,
            notifier,
            session_rx,
            events_tx,
            events_rx,
            ticket: NavTicket::default(),
            screen: Screen::Blank,
        })
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    /// The location currently shown, if any.
    pub fn location(&self) -> Option<&str> {
        match &self.screen {
            Screen::Route(screen) => Some(&screen.path),
            Screen::Recovery(recovery) => Some(&recovery.path),
            Screen::Blank => None,
        }
    }

    pub fn ticket(&self) -> NavTicket {
        self.ticket
    }

    pub fn session(&self) -> &SessionStore {
        self.providers.session()
    }

    pub fn cart(&self) -> &CartScope {
        self.providers.cart()
    }

    pub fn theme(&self) -> &ThemeScope {
        self.providers.theme()
    }

    pub fn loader(&self) -> &DeferredLoader {
        &self.loader
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    /// True while any region of the current screen is still loading.
    pub fn has_pending(&self) -> bool {
        match &self.screen {
            Screen::Route(screen) => screen.regions.iter().any(Region::is_loading),
            _ => false,
        }
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    /// Navigates to `location`, following guard redirects.
    ///
    /// Ignored while the recovery view is shown; [`reload`](Self::reload)
    /// first.
    pub fn navigate(&mut self, location: &str) {
        if let Screen::Recovery(_) = self.screen {
            warn!(location, "Navigation ignored until the page is reloaded");
            return;
        }
        self.route_to(location.to_string(), true);
    }

    fn route_to(&mut self, location: String, announce: bool) {
        self.ticket = self.ticket.next();
        let table = Arc::clone(&self.table);
        let mut location = location;

        for _ in 0..=self.config.routing.max_redirects {
            let viewer = self.providers.session().snapshot();
            let route = table.match_path(&location);

            match guard(&route, &viewer, &self.targets) {
                RenderDirective::Redirect(redirect) => {
                    let next = redirect.location(&self.config.routing.return_param);
                    info!(
                        ticket = %self.ticket,
                        from = %location,
                        to = %next,
                        route = route.entry.name(),
                        "Guard redirected navigation"
                    );
                    if announce && redirect.return_to.is_some() {
                        self.notifier.notify(Notification::info(SIGN_IN_REQUIRED));
                    }
                    location = next;
                }
                RenderDirective::RenderView(target) => {
                    debug!(
                        ticket = %self.ticket,
                        path = %location,
                        route = route.entry.name(),
                        "Rendering route"
                    );
                    let screen = RouteScreen {
                        path: location.clone(),
                        route: route.entry.name().to_string(),
                        access: route.entry.access(),
                        params: route.params.clone(),
                        regions: Self::regions_for(&target),
                    };
                    self.enter(screen);
                    return;
                }
            }
        }

        error!(location = %location, "Redirect limit exceeded");
        self.screen = Screen::Recovery(RecoveryView::new(location, "Too many redirects"));
    }

    fn regions_for(target: &ViewTarget) -> Vec<Region> {
        let placeholder = if target.is_sectioned() {
            Placeholder::Section
        } else {
            Placeholder::Page
        };

        target
            .views()
            .iter()
            .map(|view| Region {
                view: view.clone(),
                placeholder,
                state: RegionState::Loading,
            })
            .collect()
    }

    fn enter(&mut self, screen: RouteScreen) {
        let count = screen.regions.len();
        self.screen = Screen::Route(screen);
        for index in 0..count {
            self.start_region(index);
        }
    }

    fn region(&self, index: usize) -> Option<&Region> {
        match &self.screen {
            Screen::Route(screen) => screen.regions.get(index),
            _ => None,
        }
    }

    fn region_mut(&mut self, index: usize) -> Option<&mut Region> {
        match &mut self.screen {
            Screen::Route(screen) => screen.regions.get_mut(index),
            _ => None,
        }
    }

    fn start_region(&mut self, index: usize) {
        let Some(view) = self.region(index).map(|region| region.view.clone()) else {
            return;
        };

        let reference = match self.registry.resolve(&view) {
            Ok(reference) => reference,
            Err(e) => {
                // Unreachable after `verify`, but never leave a region spinning.
                error!(view = %view, error = %e, "Routed view is not registered");
                self.fail_region(index, LoadFailure::fetch(view.as_str(), e.to_string()));
                return;
            }
        };

        match self.loader.load(&reference) {
            LoadResult::Ready(handle) => self.render_region(index, handle),
            LoadResult::Pending => self.await_region(index, &view),
            LoadResult::Failed(failure) => self.fail_region(index, failure),
        }
    }

    fn await_region(&self, index: usize, view: &ViewId) {
        let Some(watch) = self.loader.watch(view) else {
            return;
        };
        let tx = self.events_tx.clone();
        let ticket = self.ticket;
        let view = view.clone();

        tokio::spawn(async move {
            watch.settled().await;
            if tx
                .send(ShellEvent::RegionResolved {
                    ticket,
                    region: index,
                    view,
                })
                .is_err()
            {
                debug!(%ticket, "Shell dropped before region resolved");
            }
        });
    }

    fn render_region(&mut self, index: usize, handle: ViewHandle) {
        let viewer = self.providers.session().snapshot();
        let theme = self.providers.theme().current();
        let scope = self.providers.cart();

        let outcome = match &self.screen {
            Screen::Route(screen) => {
                let Some(region) = screen.regions.get(index) else {
                    return;
                };
                let boundary = self.providers.boundary();
                boundary.supervise(&screen.path, region.view.as_str(), || {
                    let cart = scope.totals();
                    handle.render(&ViewContext {
                        view: &region.view,
                        location: &screen.path,
                        params: &screen.params,
                        viewer: &viewer,
                        theme,
                        cart: &cart,
                    })
                })
            }
            _ => return,
        };

        match outcome {
            Ok(rendered) => {
                if let Some(region) = self.region_mut(index) {
                    region.state = RegionState::Ready(rendered);
                }
            }
            Err(recovery) => self.screen = Screen::Recovery(recovery),
        }
    }

    fn fail_region(&mut self, index: usize, failure: LoadFailure) {
        let Some(region) = self.region_mut(index) else {
            return;
        };
        warn!(view = %region.view, region = index, %failure, "Region failed to load");
        let message = format!(
            "Part of this page could not be loaded ({}). Retry region {}.",
            region.view, index
        );
        region.state = RegionState::Failed(failure);
        self.notifier.notify(Notification::warning(message));
    }

    // =========================================================================
    // Event Loop
    // =========================================================================

    /// Waits for the next completion or session change and applies it.
    ///
    /// Never returns if nothing is in flight and the session stays put; check
    /// [`has_pending`](Self::has_pending) first, or race it against input.
    pub async fn pump(&mut self) {
        tokio::select! {
            Some(event) = self.events_rx.recv() => self.apply(event),
            Ok(()) = self.session_rx.changed() => {
                let viewer = self.session_rx.borrow_and_update().clone();
                self.on_session_changed(viewer);
            }
            else => {}
        }
    }

    /// Pumps until no region of the current screen is loading.
    pub async fn settle(&mut self) {
        while self.has_pending() {
            self.pump().await;
        }
    }

    fn apply(&mut self, event: ShellEvent) {
        let ShellEvent::RegionResolved {
            ticket,
            region,
            view,
        } = event;

        self.sync_session();

        if ticket != self.ticket {
            debug!(%ticket, current = %self.ticket, view = %view, "Discarding stale completion");
            return;
        }

        let viewer = self.providers.session().snapshot();
        if !self.reevaluate(&viewer) {
            return;
        }

        if self.region(region).map(|r| &r.view) != Some(&view) {
            return;
        }

        match self.loader.status(&view) {
            Some(LoadResult::Ready(handle)) => self.render_region(region, handle),
            Some(LoadResult::Failed(failure)) => self.fail_region(region, failure),
            _ => debug!(view = %view, "Completion observed before slot settled"),
        }
    }

    /// Applies a session change that has not been observed yet.
    fn sync_session(&mut self) {
        if self.session_rx.has_changed().unwrap_or(false) {
            let viewer = self.session_rx.borrow_and_update().clone();
            self.on_session_changed(viewer);
        }
    }

    fn on_session_changed(&mut self, viewer: ViewerState) {
        debug!(authenticated = viewer.is_authenticated(), "Session changed");
        if self.reevaluate(&viewer) {
            self.refresh_ready_regions();
        }
    }

    /// Re-runs the guard for the active route. Returns true if it still renders.
    fn reevaluate(&mut self, viewer: &ViewerState) -> bool {
        let Screen::Route(screen) = &self.screen else {
            return false;
        };
        let path = screen.path.clone();
        let table = Arc::clone(&self.table);
        let route = table.match_path(&path);

        let RenderDirective::Redirect(redirect) = guard(&route, viewer, &self.targets) else {
            return true;
        };

        let param = self.config.routing.return_param.clone();
        let next = match route.entry.access() {
            AccessClass::AuthOnly => {
                return_target(&path, &param).unwrap_or_else(|| self.targets.landing.clone())
            }
            AccessClass::Private => {
                self.notifier.notify(Notification::info(SESSION_ENDED));
                redirect.location(&param)
            }
            AccessClass::Public => redirect.location(&param),
        };

        info!(from = %path, to = %next, "Session change moved the active route");
        self.route_to(next, false);
        false
    }

    fn refresh_ready_regions(&mut self) {
        let ready: Vec<(usize, ViewId)> = match &self.screen {
            Screen::Route(screen) => screen
                .regions
                .iter()
                .enumerate()
                .filter(|(_, region)| matches!(region.state, RegionState::Ready(_)))
                .map(|(index, region)| (index, region.view.clone()))
                .collect(),
            _ => return,
        };

        for (index, view) in ready {
            if let Some(LoadResult::Ready(handle)) = self.loader.status(&view) {
                self.render_region(index, handle);
            }
        }
    }

    // =========================================================================
    // Viewer Actions
    // =========================================================================

    /// Signs in and re-guards the active route immediately.
    pub fn sign_in(&mut self, user_id: &str, display_name: Option<&str>) -> ShellResult<Identity> {
        let identity = self.providers.session().sign_in(user_id, display_name)?;
        self.sync_session();
        Ok(identity)
    }

    /// Signs out and re-guards the active route immediately.
    pub fn sign_out(&mut self) -> Option<Identity> {
        let identity = self.providers.session().sign_out();
        self.sync_session();
        identity
    }

    /// Retries a region whose load failed. Returns false if there was nothing
    /// to retry.
    pub fn retry_region(&mut self, index: usize) -> bool {
        match self.region_mut(index) {
            Some(region) if matches!(region.state, RegionState::Failed(_)) => {
                info!(view = %region.view, region = index, "Retrying region");
                region.state = RegionState::Loading;
            }
            _ => return false,
        }
        self.start_region(index);
        true
    }

    /// Discards all in-memory state and reloads the current location.
    ///
    /// Session, cart, loader cache and screen all start over.
    pub fn reload(&mut self) {
        let location = self
            .location()
            .map(str::to_string)
            .unwrap_or_else(|| self.targets.landing.clone());
        info!(location = %location, "Reloading storefront");

        self.loader = DeferredLoader::new(self.config.fetch_timeout());
        self.screen = Screen::Blank;

        match Providers::mount(&self.stack, &self.config) {
            Ok(providers) => {
                self.session_rx = providers.session().subscribe();
                self.providers = providers;
                self.route_to(location, true);
            }
            Err(e) => {
                error!(error = %e, "Provider scopes failed to mount");
                self.screen = Screen::Recovery(RecoveryView::new(location, e.to_string()));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RenderFault;
    use crate::notify::{MemoryNotifier, NotificationConfig};
    use crate::view::View;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::time::Duration;
    use storefront_core::RouteEntry;

    struct Titled(&'static str);

    impl View for Titled {
        fn render(&self, ctx: &ViewContext<'_>) -> Result<Rendered, RenderFault> {
            let mut rendered = Rendered::new(self.0);
            if let Some(id) = ctx.params.get("id") {
                rendered = rendered.line(format!("id={}", id));
            }
            if let Some(identity) = ctx.viewer.identity() {
                rendered = rendered.line(format!("viewer={}", identity.user_id));
            }
            Ok(rendered)
        }
    }

    struct Faulty;

    impl View for Faulty {
        fn render(&self, _ctx: &ViewContext<'_>) -> Result<Rendered, RenderFault> {
            Err(RenderFault::new("checkout state missing"))
        }
    }

    fn page(id: &str) -> ViewTarget {
        ViewTarget::Page(ViewId::new(id))
    }

    fn table() -> RouteTable {
        RouteTable::new(vec![
            RouteEntry::new(
                "home",
                "/",
                AccessClass::Public,
                ViewTarget::Sections(vec![ViewId::new("hero"), ViewId::new("testimonials")]),
            )
            .unwrap(),
            RouteEntry::new("product", "/product/:id", AccessClass::Public, page("product"))
                .unwrap(),
            RouteEntry::new("login", "/login", AccessClass::AuthOnly, page("login")).unwrap(),
            RouteEntry::new("profile", "/profile", AccessClass::Private, page("profile")).unwrap(),
            RouteEntry::new("checkout", "/checkout", AccessClass::Private, page("checkout"))
                .unwrap(),
            RouteEntry::new("not-found", "*", AccessClass::Public, page("not-found")).unwrap(),
        ])
        .unwrap()
    }

    /// Views sleep for `latency`; "testimonials" fails while `broken` is set.
    fn registry(latency: Duration, broken: Arc<AtomicBool>) -> ViewRegistry {
        let mut builder = ViewRegistry::builder();
        for id in ["hero", "product", "login", "profile", "not-found"] {
            let title: &'static str = id;
            builder
                .register(id, move || async move {
                    tokio::time::sleep(latency).await;
                    Ok::<_, LoadFailure>(Arc::new(Titled(title)) as ViewHandle)
                })
                .unwrap();
        }
        builder
            .register("testimonials", move || {
                let broken = broken.load(Ordering::SeqCst);
                async move {
                    tokio::time::sleep(latency).await;
                    if broken {
                        Err(LoadFailure::fetch("testimonials", "chunk missing"))
                    } else {
                        Ok::<_, LoadFailure>(Arc::new(Titled("testimonials")) as ViewHandle)
                    }
                }
            })
            .unwrap();
        builder
            .register("checkout", move || async move {
                tokio::time::sleep(latency).await;
                Ok::<_, LoadFailure>(Arc::new(Faulty) as ViewHandle)
            })
            .unwrap();
        builder.seal()
    }

    /// Renders a title and counts how often it was asked to.
    struct Counted {
        title: &'static str,
        renders: Arc<AtomicUsize>,
    }

    impl View for Counted {
        fn render(&self, _ctx: &ViewContext<'_>) -> Result<Rendered, RenderFault> {
            self.renders.fetch_add(1, Ordering::SeqCst);
            Ok(Rendered::new(self.title))
        }
    }

    fn counting_registry(renders: Arc<AtomicUsize>) -> ViewRegistry {
        let mut builder = ViewRegistry::builder();
        let ids = [
            "hero",
            "testimonials",
            "product",
            "login",
            "profile",
            "checkout",
            "not-found",
        ];
        for id in ids {
            let renders = Arc::clone(&renders);
            builder
                .register(id, move || {
                    let view = Arc::new(Counted {
                        title: id,
                        renders: Arc::clone(&renders),
                    });
                    async move {
                        tokio::time::sleep(Duration::from_millis(20)).await;
                        Ok::<_, LoadFailure>(view as ViewHandle)
                    }
                })
                .unwrap();
        }
        builder.seal()
    }

    fn shell_with(broken: bool) -> (Shell, MemoryNotifier, Arc<AtomicBool>) {
        let broken = Arc::new(AtomicBool::new(broken));
        let notifier = MemoryNotifier::new(&NotificationConfig::default());
        let shell = Shell::new(
            table(),
            registry(Duration::from_millis(20), Arc::clone(&broken)),
            StorefrontConfig::default(),
            Arc::new(notifier.clone()),
        )
        .unwrap();
        (shell, notifier, broken)
    }

    fn route(shell: &Shell) -> &RouteScreen {
        match shell.screen() {
            Screen::Route(screen) => screen,
            other => panic!("expected a route screen, got {:?}", other),
        }
    }

    fn title(region: &Region) -> &str {
        match &region.state {
            RegionState::Ready(rendered) => &rendered.title,
            other => panic!("region {} not ready: {:?}", region.view, other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_public_page_shows_placeholder_then_renders() {
        let (mut shell, _, _) = shell_with(false);

        shell.navigate("/product/42");
        let screen = route(&shell);
        assert_eq!(screen.regions[0].placeholder, Placeholder::Page);
        assert!(screen.regions[0].is_loading());

        shell.settle().await;
        let screen = route(&shell);
        assert_eq!(title(&screen.regions[0]), "product");
        assert_eq!(
            screen.regions[0].state,
            RegionState::Ready(Rendered::new("product").line("id=42"))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_anonymous_private_redirects_then_returns_after_sign_in() {
        let (mut shell, notifier, _) = shell_with(false);

        shell.navigate("/profile");
        assert_eq!(shell.location(), Some("/login?redirect=%2Fprofile"));
        assert_eq!(route(&shell).route, "login");
        assert_eq!(notifier.messages(), vec![SIGN_IN_REQUIRED]);
        assert_eq!(shell.loader().fetch_count(&ViewId::new("profile")), 0);

        shell.sign_in("ada", None).unwrap();
        assert_eq!(shell.location(), Some("/profile"));
        shell.settle().await;
        assert_eq!(title(&route(&shell).regions[0]), "profile");
    }

    #[tokio::test(start_paused = true)]
    async fn test_signed_in_viewer_bounced_from_login() {
        let (mut shell, _, _) = shell_with(false);
        shell.sign_in("ada", None).unwrap();

        shell.navigate("/login");
        assert_eq!(shell.location(), Some("/"));
        assert_eq!(route(&shell).route, "home");
        assert_eq!(shell.loader().fetch_count(&ViewId::new("login")), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sign_out_on_private_route_redirects_immediately() {
        let (mut shell, notifier, _) = shell_with(false);
        shell.sign_in("ada", None).unwrap();
        shell.navigate("/profile");
        shell.settle().await;

        shell.sign_out();
        assert_eq!(route(&shell).route, "login");
        assert_eq!(notifier.messages()[0], SESSION_ENDED);
    }

    #[tokio::test(start_paused = true)]
    async fn test_external_session_change_is_pumped() {
        let (mut shell, _, _) = shell_with(false);
        shell.sign_in("ada", None).unwrap();
        shell.navigate("/profile");
        shell.settle().await;

        let session = shell.session().clone();
        session.sign_out();
        shell.pump().await;
        assert_eq!(route(&shell).route, "login");
    }

    #[tokio::test(start_paused = true)]
    async fn test_section_failure_is_regional_and_retryable() {
        let (mut shell, notifier, broken) = shell_with(true);

        shell.navigate("/");
        let screen = route(&shell);
        assert!(screen
            .regions
            .iter()
            .all(|r| r.placeholder == Placeholder::Section));

        shell.settle().await;
        let screen = route(&shell);
        assert_eq!(title(&screen.regions[0]), "hero");
        assert!(matches!(
            screen.regions[1].state,
            RegionState::Failed(LoadFailure::Fetch { .. })
        ));
        assert_eq!(notifier.entries()[0].level, crate::notify::Level::Warning);

        broken.store(false, Ordering::SeqCst);
        assert!(shell.retry_region(1));
        assert!(!shell.retry_region(0));
        shell.settle().await;

        let screen = route(&shell);
        assert_eq!(title(&screen.regions[1]), "testimonials");
        assert_eq!(shell.loader().fetch_count(&ViewId::new("testimonials")), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_render_fault_shows_recovery_until_reload() {
        let (mut shell, _, _) = shell_with(false);
        shell.sign_in("ada", None).unwrap();

        shell.navigate("/checkout");
        shell.settle().await;
        let Screen::Recovery(recovery) = shell.screen() else {
            panic!("expected recovery view, got {:?}", shell.screen());
        };
        assert_eq!(recovery.message, "checkout state missing");
        assert_eq!(recovery.path, "/checkout");

        shell.navigate("/");
        assert!(matches!(shell.screen(), Screen::Recovery(_)));

        // Reload discards the session, so the private route now redirects.
        shell.reload();
        assert!(!shell.session().is_authenticated());
        assert_eq!(shell.location(), Some("/login?redirect=%2Fcheckout"));
        assert_eq!(shell.loader().fetch_count(&ViewId::new("checkout")), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_completion_is_discarded() {
        let (mut shell, _, _) = shell_with(false);

        shell.navigate("/product/1");
        let first = shell.ticket();
        shell.navigate("/product/2");
        assert!(shell.ticket() > first);

        shell.settle().await;
        let screen = route(&shell);
        assert_eq!(screen.path, "/product/2");
        assert_eq!(
            screen.regions[0].state,
            RegionState::Ready(Rendered::new("product").line("id=2"))
        );
        // Both navigations shared one fetch.
        assert_eq!(shell.loader().fetch_count(&ViewId::new("product")), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_superseded_navigation_completion_is_not_rendered() {
        let renders = Arc::new(AtomicUsize::new(0));
        let mut shell = Shell::new(
            table(),
            counting_registry(Arc::clone(&renders)),
            StorefrontConfig::default(),
            Arc::new(MemoryNotifier::default()),
        )
        .unwrap();

        // Same view, same region index: only the ticket tells them apart.
        shell.navigate("/product/1");
        shell.navigate("/product/2");
        shell.settle().await;

        // Apply whatever is still queued, in whatever order it arrived.
        while tokio::time::timeout(Duration::from_secs(1), shell.pump())
            .await
            .is_ok()
        {}

        assert_eq!(title(&route(&shell).regions[0]), "product");
        assert_eq!(renders.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rejected_cart_price_leaves_rendering_intact() {
        let (mut shell, _, _) = shell_with(false);

        let rejected = shell
            .cart()
            .with_cart_mut(|cart| cart.add_item("x", "x", i64::MAX, 2));
        assert!(matches!(rejected, Err(crate::cart::CartError::InvalidPrice { .. })));
        assert!(shell.cart().totals().is_empty());

        shell.navigate("/product/9");
        shell.settle().await;
        assert_eq!(title(&route(&shell).regions[0]), "product");
    }

    #[tokio::test(start_paused = true)]
    async fn test_completion_after_navigating_away_leaves_new_screen_alone() {
        let (mut shell, _, _) = shell_with(false);

        shell.navigate("/product/7");
        shell.sign_in("ada", None).unwrap();
        shell.navigate("/profile");

        shell.settle().await;
        let screen = route(&shell);
        assert_eq!(screen.route, "profile");
        assert_eq!(screen.regions.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_session_change_before_completion_is_reguarded() {
        let (mut shell, _, _) = shell_with(false);
        shell.sign_in("ada", None).unwrap();
        shell.navigate("/profile");
        assert!(shell.has_pending());

        // Sign out behind the shell's back while the page is still loading.
        shell.session().sign_out();
        shell.settle().await;

        let screen = route(&shell);
        assert_eq!(screen.route, "login");
        assert_eq!(title(&screen.regions[0]), "login");
    }

    #[tokio::test(start_paused = true)]
    async fn test_revisit_uses_cached_module() {
        let (mut shell, _, _) = shell_with(false);

        shell.navigate("/product/1");
        shell.settle().await;
        shell.navigate("/nowhere");
        shell.settle().await;
        assert_eq!(route(&shell).route, "not-found");

        shell.navigate("/product/1");
        assert!(!shell.has_pending());
        assert_eq!(shell.loader().fetch_count(&ViewId::new("product")), 1);
    }

    #[test]
    fn test_startup_rejects_unregistered_views() {
        let err = Shell::new(
            table(),
            ViewRegistry::builder().seal(),
            StorefrontConfig::default(),
            Arc::new(MemoryNotifier::default()),
        )
        .err()
        .unwrap();
        assert!(err.is_config_error());
    }

    #[test]
    fn test_startup_rejects_private_sign_in_target() {
        let mut config = StorefrontConfig::default();
        config.routing.sign_in_path = "/profile".into();

        let err = Shell::new(
            table(),
            registry(Duration::ZERO, Arc::default()),
            config,
            Arc::new(MemoryNotifier::default()),
        )
        .err()
        .unwrap();
        assert!(err.to_string().contains("/profile"));
    }

    #[test]
    fn test_screen_display() {
        let screen = Screen::Recovery(RecoveryView::new("/checkout", "boom"));
        let text = screen.to_string();
        assert!(text.contains("Oops! Something went wrong"));
        assert!(text.contains("[Reload Page]"));
    }
}
