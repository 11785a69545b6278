//! Parent/child relationship protocol
//!
//! Children point at their parent through a `Link` field named by
//! [`Relatable::parent_field`]. Saving a parent with children is best-effort
//! and non-atomic: the parent is saved first, then every child concurrently;
//! child saves that already went through are not rolled back when a sibling
//! fails.

use futures_util::stream::{FuturesUnordered, StreamExt};

use super::{ManagerError, ManagerResult, RecordManager};
use crate::mapping::{Mapped, Relatable};
use crate::observability::ObservationScope;
use crate::store::Predicate;

impl<T: Mapped> RecordManager<T> {
    /// Save `parent`, then point every child at it and save the children
    ///
    /// No child is saved if the parent save fails. Otherwise every child save
    /// runs to completion and the first failure observed is returned. Returns
    /// the saved parent.
    pub async fn save_parent_with_children<C: Relatable>(
        &self,
        parent: &T,
        children: Vec<C>,
    ) -> ManagerResult<T> {
        self.bounded("save_parent_with_children", async move {
            let scope = ObservationScope::with_fields(
                "SAVE_WITH_CHILDREN",
                vec![
                    ("record_type", T::record_type().to_string()),
                    ("children", children.len().to_string()),
                ],
            );

            let saved = match self.save_item(parent).await {
                Ok(saved) => saved,
                Err(e) => {
                    scope.fail(&e.to_string());
                    return Err(e);
                }
            };
            let Some(parent_id) = saved.record_id() else {
                let e = ManagerError::missing_identifier(T::record_type());
                scope.fail(&e.to_string());
                return Err(e);
            };

            let mut children = children;
            for child in &mut children {
                child.set_parent(Some(parent_id.clone()));
            }

            let child_manager = self.scoped::<C>();
            let mut pending: FuturesUnordered<_> = children
                .iter()
                .map(|child| child_manager.save_item(child))
                .collect();

            let mut first_error = None;
            while let Some(result) = pending.next().await {
                if let Err(e) = result {
                    first_error.get_or_insert(e);
                }
            }

            match first_error {
                Some(e) => {
                    scope.fail(&e.to_string());
                    Err(e)
                }
                None => {
                    scope.complete();
                    Ok(saved)
                }
            }
        })
        .await
    }

    /// Every `C` whose parent field points at `parent`
    pub async fn fetch_children_for_parent<C: Relatable>(&self, parent: &T) -> ManagerResult<Vec<C>> {
        let parent_id = parent
            .record_id()
            .ok_or_else(|| ManagerError::missing_identifier(T::record_type()))?;
        self.scoped::<C>()
            .fetch_where(&Predicate::reference_eq(C::parent_field(), parent_id))
            .await
    }
}
