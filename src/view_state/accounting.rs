//! Accounting screen: item form, tag autocomplete, item list.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, Weak};

use futures::future::{self, BoxFuture, FutureExt, Shared as SharedFuture};
use tracing::{debug, info, warn};

use crate::config::ViewConfig;
use crate::error::ServiceResult;
use crate::models::{format_input_number, Amount, AmountType, Item, ItemUpdate, NewItem, Tag, TagOption};
use crate::reactive::{
    bridge, latest_with_reset, lock, notifier, on_commit, suggestions, Behavior, Callback,
    CommitOutcome, FieldState, Scope, Shared, Source, Subject,
};
use crate::traits::AccountingService;

type PendingTag = SharedFuture<BoxFuture<'static, ServiceResult<Tag>>>;
type Registry = Arc<Mutex<HashMap<String, PendingTag>>>;
type ResolvedId = BoxFuture<'static, ServiceResult<Option<String>>>;

/// One `create_tag` call per label, shared by everyone waiting on it.
///
/// An entry lives until its creation fails or its placeholder has been
/// resolved in the selection; a later attempt then calls again.
#[derive(Clone)]
struct TagCreations {
    service: Arc<dyn AccountingService>,
    pending: Registry,
}

impl TagCreations {
    fn new(service: Arc<dyn AccountingService>) -> Self {
        Self {
            service,
            pending: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// The creation for `label`, and whether this call started it.
    fn ensure(&self, label: &str) -> (PendingTag, bool) {
        let mut pending = lock(&self.pending);
        if let Some(existing) = pending.get(label) {
            return (existing.clone(), false);
        }
        (self.start(&mut pending, label), true)
    }

    fn start(&self, pending: &mut HashMap<String, PendingTag>, label: &str) -> PendingTag {
        let service = Arc::clone(&self.service);
        let registry: Weak<Mutex<HashMap<String, PendingTag>>> = Arc::downgrade(&self.pending);
        let name = label.to_string();
        let creation = async move {
            let result = service.create_tag(&name).await;
            if result.is_err() {
                if let Some(registry) = registry.upgrade() {
                    lock(&registry).remove(&name);
                }
            }
            result
        }
        .boxed()
        .shared();
        pending.insert(label.to_string(), creation.clone());
        creation
    }

    /// Swap the placeholders for `label` with `tag`, then drop the entry.
    ///
    /// The selection is updated first, so a commit that misses the entry
    /// finds the resolved tag in the selection instead.
    fn settle(&self, label: &str, tag: &Tag, selected: &Behavior<Vec<TagOption>>) {
        selected.update(|options| resolve_placeholder(options, label, tag));
        lock(&self.pending).remove(label);
    }

    /// Id the placeholder `label` stands for, creating the tag if needed.
    fn id_for(&self, label: &str, selected: &Behavior<Vec<TagOption>>) -> ResolvedId {
        let mut pending = lock(&self.pending);
        if let Some(creation) = pending.get(label) {
            return creation.clone().map(|result| result.map(|tag| Some(tag.id))).boxed();
        }
        let resolved = selected.with(|options| {
            options
                .iter()
                .find(|o| o.create.is_none() && o.label == label)
                .and_then(|o| o.id.clone())
        });
        if let Some(id) = resolved {
            return future::ready(Ok(Some(id))).boxed();
        }
        let creation = self.start(&mut pending, label);
        drop(pending);
        let registry = Arc::downgrade(&self.pending);
        let label = label.to_string();
        creation
            .map(move |result| {
                if let Some(registry) = registry.upgrade() {
                    lock(&registry).remove(&label);
                }
                result.map(|tag| Some(tag.id))
            })
            .boxed()
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        lock(&self.pending).len()
    }
}

#[derive(Debug, Clone)]
struct AddDraft {
    name: String,
    amount: Amount,
    amount_type: AmountType,
    selection: Vec<TagOption>,
}

struct Inputs {
    name: Callback<String>,
    amount: Callback<String>,
    currency: Callback<String>,
    amount_type: Callback<AmountType>,
    tag_input: Callback<String>,
    tags: Callback<Vec<TagOption>>,
    add: Callback<()>,
    delete_request: Callback<Item>,
    delete_cancel: Callback<()>,
    delete_confirm: Callback<()>,
    item_update: Callback<ItemUpdate>,
}

/// View state of the accounting screen.
///
/// Mount it inside a tokio runtime; the item list, the currency list and the
/// tag suggestions start loading right away. Every input goes through an
/// `on_*` method, and every piece of display state is a [`Behavior`] or
/// [`FieldState`] the renderer can read or watch.
pub struct AccountingScreen {
    scope: Scope,
    inputs: Inputs,
    name: FieldState<String>,
    amount: FieldState<String>,
    currency: FieldState<String>,
    amount_type: FieldState<AmountType>,
    items: Behavior<Option<Vec<Item>>>,
    currencies: Behavior<Option<Vec<String>>>,
    tag_options: Behavior<Vec<TagOption>>,
    selected_tags: Behavior<Vec<TagOption>>,
    pending_delete: Behavior<Option<Item>>,
    add_outcomes: Shared<CommitOutcome<Item>>,
}

impl AccountingScreen {
    pub fn mount(service: Arc<dyn AccountingService>, config: &ViewConfig) -> Self {
        let scope = Scope::new("accounting");

        let (name_cb, name_changes) = bridge::<String>();
        let (amount_cb, amount_changes) = bridge::<String>();
        let (currency_cb, currency_changes) = bridge::<String>();
        let (amount_type_cb, amount_type_changes) = bridge::<AmountType>();
        let (tag_input_cb, tag_keywords) = bridge::<String>();
        let (tags_cb, tag_selections) = bridge::<Vec<TagOption>>();
        let (add_cb, adds) = notifier();
        let (delete_request_cb, delete_requests) = bridge::<Item>();
        let (delete_cancel_cb, delete_cancels) = notifier();
        let (delete_confirm_cb, delete_confirms) = notifier();
        let (item_update_cb, item_updates) = bridge::<ItemUpdate>();

        let add_succeeded = Subject::<()>::new();
        let items_refresh = Subject::<()>::new();
        let tags_refresh = Subject::<()>::new();

        let name = latest_with_reset(
            &name_changes.take_until(&scope),
            String::new(),
            &add_succeeded.source(),
        );
        let amount = latest_with_reset(
            &amount_changes
                .take_until(&scope)
                .map(|raw: &String| format_input_number(raw)),
            "0".to_string(),
            &add_succeeded.source(),
        );
        let currency = latest_with_reset(
            &currency_changes.take_until(&scope),
            config.default_currency.clone(),
            &Source::<()>::empty(),
        );
        let amount_type = latest_with_reset(
            &amount_type_changes.take_until(&scope),
            AmountType::default(),
            &Source::<()>::empty(),
        );

        let items = {
            let service = Arc::clone(&service);
            items_refresh
                .source()
                .start_with(())
                .take_until(&scope)
                .switch_map(&scope, move |_| {
                    let service = Arc::clone(&service);
                    async move { service.list_items().await }
                })
                .filter_map(|result| match result {
                    Ok(items) => Some(Some(items.clone())),
                    Err(err) => {
                        warn!(error = %err, "failed to list items");
                        None
                    }
                })
                .hold(None)
        };

        let currencies = {
            let service = Arc::clone(&service);
            Source::<()>::empty()
                .start_with(())
                .take_until(&scope)
                .switch_map(&scope, move |_| {
                    let service = Arc::clone(&service);
                    async move { service.list_currencies().await }
                })
                .filter_map(|result| match result {
                    Ok(codes) => Some(Some(codes.clone())),
                    Err(err) => {
                        warn!(error = %err, "failed to list currencies");
                        None
                    }
                })
                .hold(None)
        };

        let tag_options = {
            let service = Arc::clone(&service);
            suggestions(&tag_keywords, &tags_refresh.source(), &scope, move |keyword| {
                let service = Arc::clone(&service);
                async move { service.search_tags(&keyword).await }
            })
            .source()
            .hold(Vec::new())
        };

        let creations = TagCreations::new(Arc::clone(&service));
        let selected_tags = Behavior::new(Vec::<TagOption>::new());
        {
            let selected = selected_tags.clone();
            let creations = creations.clone();
            let refresh = tags_refresh.clone();
            let spawner = scope.clone();
            let subscription = tag_selections.take_until(&scope).subscribe(move |selection| {
                selected.set(selection.clone());
                for option in selection.iter().filter(|o| o.is_placeholder()) {
                    let Some(label) = option.create.clone() else {
                        continue;
                    };
                    let (creation, started) = creations.ensure(&label);
                    if !started {
                        // finished but not yet settled: resolve from its result
                        if let Some(Ok(tag)) = creation.peek() {
                            creations.settle(&label, tag, &selected);
                        }
                        continue;
                    }
                    let selected = selected.clone();
                    let refresh = refresh.clone();
                    let creations = creations.clone();
                    spawner.spawn(async move {
                        match creation.await {
                            Ok(tag) => {
                                info!(tag = %tag.name, id = %tag.id, "tag created");
                                creations.settle(&label, &tag, &selected);
                                refresh.emit(());
                            }
                            Err(err) => {
                                warn!(tag = %label, error = %err, "failed to create tag");
                                selected.update(|options| {
                                    options.retain(|o| o.create.as_deref() != Some(label.as_str()) || o.id.is_some())
                                });
                            }
                        }
                    });
                }
            });
            scope.keep(subscription);
        }

        let add_outcomes = {
            let fields = (name.clone(), amount.clone(), currency.clone(), amount_type.clone());
            let selection = selected_tags.clone();
            let current = selected_tags.clone();
            let service = Arc::clone(&service);
            on_commit(
                &adds,
                &scope,
                move |_| {
                    let (name, amount, currency, amount_type) = &fields;
                    Some(AddDraft {
                        name: name.get(),
                        amount: Amount::new(amount.get(), currency.get()),
                        amount_type: amount_type.get(),
                        selection: selection.get(),
                    })
                },
                move |draft: AddDraft| {
                    let resolutions: Vec<ResolvedId> = draft
                        .selection
                        .iter()
                        .map(|option| match (&option.id, &option.create) {
                            (Some(id), _) => future::ready(Ok(Some(id.clone()))).boxed(),
                            (None, Some(label)) => creations.id_for(label, &current),
                            (None, None) => future::ready(Ok(None)).boxed(),
                        })
                        .collect();
                    let service = Arc::clone(&service);
                    async move {
                        let resolved = future::try_join_all(resolutions).await?;
                        let mut tags: Vec<String> = Vec::with_capacity(resolved.len());
                        for id in resolved.into_iter().flatten() {
                            if !tags.contains(&id) {
                                tags.push(id);
                            }
                        }
                        service
                            .add_item(NewItem {
                                name: draft.name,
                                amount: draft.amount,
                                amount_type: draft.amount_type,
                                tags,
                            })
                            .await
                    }
                },
            )
        };
        {
            let reset = add_succeeded.clone();
            let selected = selected_tags.clone();
            let refresh = items_refresh.clone();
            scope.keep(add_outcomes.subscribe(move |outcome| {
                if let CommitOutcome::Succeeded(item) = outcome {
                    info!(id = %item.id, "item added");
                    reset.emit(());
                    selected.set(Vec::new());
                    refresh.emit(());
                }
            }));
        }

        let pending_delete = Behavior::new(None::<Item>);
        {
            let pending = pending_delete.clone();
            scope.keep(
                delete_requests
                    .map(|item: &Item| Some(item.clone()))
                    .merge(&delete_cancels.map(|_| None))
                    .take_until(&scope)
                    .subscribe(move |request| pending.set(request.clone())),
            );
        }
        let deletions = {
            let pending = pending_delete.clone();
            let service = Arc::clone(&service);
            on_commit(
                &delete_confirms,
                &scope,
                move |_| pending.get().map(|item| item.id),
                move |id: String| {
                    let service = Arc::clone(&service);
                    async move { service.delete_item(&id).await }
                },
            )
        };
        {
            let pending = pending_delete.clone();
            let refresh = items_refresh.clone();
            scope.keep(deletions.subscribe(move |outcome| {
                if outcome.is_success() {
                    pending.set(None);
                    refresh.emit(());
                }
            }));
        }

        let updates = {
            let service = Arc::clone(&service);
            on_commit(
                &item_updates,
                &scope,
                |update: &ItemUpdate| Some(update.clone()),
                move |update: ItemUpdate| {
                    let service = Arc::clone(&service);
                    async move { service.update_item(update).await }
                },
            )
        };
        {
            let refresh = items_refresh.clone();
            scope.keep(updates.subscribe(move |outcome| {
                if let CommitOutcome::Succeeded(item) = outcome {
                    debug!(id = %item.id, "item updated");
                    refresh.emit(());
                }
            }));
        }

        info!("accounting screen mounted");
        Self {
            scope,
            inputs: Inputs {
                name: name_cb,
                amount: amount_cb,
                currency: currency_cb,
                amount_type: amount_type_cb,
                tag_input: tag_input_cb,
                tags: tags_cb,
                add: add_cb,
                delete_request: delete_request_cb,
                delete_cancel: delete_cancel_cb,
                delete_confirm: delete_confirm_cb,
                item_update: item_update_cb,
            },
            name,
            amount,
            currency,
            amount_type,
            items,
            currencies,
            tag_options,
            selected_tags,
            pending_delete,
            add_outcomes,
        }
    }

    pub fn on_name_change(&self, value: impl Into<String>) {
        self.inputs.name.call(value.into());
    }

    /// Raw amount text; it is sanitised before it reaches the field.
    pub fn on_amount_change(&self, value: impl Into<String>) {
        self.inputs.amount.call(value.into());
    }

    pub fn on_currency_change(&self, value: impl Into<String>) {
        self.inputs.currency.call(value.into());
    }

    pub fn on_amount_type_change(&self, value: AmountType) {
        self.inputs.amount_type.call(value);
    }

    pub fn on_tag_input_change(&self, keyword: impl Into<String>) {
        self.inputs.tag_input.call(keyword.into());
    }

    /// The full new selection of the tag input.
    pub fn on_tags_change(&self, selection: Vec<TagOption>) {
        self.inputs.tags.call(selection);
    }

    pub fn on_add(&self) {
        self.inputs.add.notify();
    }

    pub fn on_delete_request(&self, item: Item) {
        self.inputs.delete_request.call(item);
    }

    pub fn on_delete_cancel(&self) {
        self.inputs.delete_cancel.notify();
    }

    pub fn on_delete_confirm(&self) {
        self.inputs.delete_confirm.notify();
    }

    pub fn on_item_update(&self, update: ItemUpdate) {
        self.inputs.item_update.call(update);
    }

    pub fn name(&self) -> &FieldState<String> {
        &self.name
    }

    pub fn amount(&self) -> &FieldState<String> {
        &self.amount
    }

    pub fn currency(&self) -> &FieldState<String> {
        &self.currency
    }

    pub fn amount_type(&self) -> &FieldState<AmountType> {
        &self.amount_type
    }

    /// `None` until the first list arrives.
    pub fn items(&self) -> &Behavior<Option<Vec<Item>>> {
        &self.items
    }

    pub fn currencies(&self) -> &Behavior<Option<Vec<String>>> {
        &self.currencies
    }

    pub fn tag_options(&self) -> &Behavior<Vec<TagOption>> {
        &self.tag_options
    }

    pub fn selected_tags(&self) -> &Behavior<Vec<TagOption>> {
        &self.selected_tags
    }

    /// Item awaiting delete confirmation.
    pub fn pending_delete(&self) -> &Behavior<Option<Item>> {
        &self.pending_delete
    }

    /// Outcome of every add commit, for banners or logging.
    pub fn add_outcomes(&self) -> &Shared<CommitOutcome<Item>> {
        &self.add_outcomes
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    /// Tear the screen down; later responses are ignored.
    pub fn unmount(&self) {
        self.scope.teardown();
    }
}

impl Drop for AccountingScreen {
    fn drop(&mut self) {
        self.scope.teardown();
    }
}

/// Replace the "create `label`" placeholder with the created tag.
fn resolve_placeholder(options: &mut Vec<TagOption>, label: &str, tag: &Tag) {
    let already_selected = options.iter().any(|o| o.id.as_deref() == Some(tag.id.as_str()));
    if already_selected {
        options.retain(|o| !(o.is_placeholder() && o.create.as_deref() == Some(label)));
        return;
    }
    for option in options.iter_mut() {
        if option.is_placeholder() && option.create.as_deref() == Some(label) {
            *option = TagOption::existing(tag);
        }
    }
}
