// The in-memory item list and its filtered/sorted view
use almox_api::{Item, TransactionKind};
use std::cmp::Ordering;
use unicase::UniCase;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    /// Only items whose `aba_origem` is exactly this tab
    Tab(String),
}

impl CategoryFilter {
    pub fn matches(&self, item: &Item) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Tab(tab) => item.aba_origem.as_deref() == Some(tab.as_str()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            CategoryFilter::All => "Todos",
            CategoryFilter::Tab(tab) => tab,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    Name,
    /// Most available first
    Available,
    /// Largest total first
    Total,
}

impl SortKey {
    pub fn next(self) -> Self {
        match self {
            SortKey::Name => SortKey::Available,
            SortKey::Available => SortKey::Total,
            SortKey::Total => SortKey::Name,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SortKey::Name => "Nome",
            SortKey::Available => "Disponível",
            SortKey::Total => "Total",
        }
    }

    /// All three orders are stable: ties keep the server's order
    pub fn sort(&self, items: &[Item], view: &mut [usize]) {
        match self {
            SortKey::Name => view.sort_by(|&a, &b| compare_names(&items[a].nome, &items[b].nome)),
            SortKey::Available => view.sort_by(|&a, &b| {
                items[b]
                    .quantidade_disponivel
                    .cmp(&items[a].quantidade_disponivel)
            }),
            SortKey::Total => {
                view.sort_by(|&a, &b| items[b].total_quantity().cmp(&items[a].total_quantity()))
            }
        }
    }
}

/// Accent- and case-insensitive name ordering, close to what a pt-BR collator does
pub fn compare_names(a: &str, b: &str) -> Ordering {
    UniCase::new(fold_accents(a)).cmp(&UniCase::new(fold_accents(b)))
}

fn fold_accents(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            'á' | 'à' | 'â' | 'ã' | 'ä' => 'a',
            'Á' | 'À' | 'Â' | 'Ã' | 'Ä' => 'A',
            'é' | 'è' | 'ê' | 'ë' => 'e',
            'É' | 'È' | 'Ê' | 'Ë' => 'E',
            'í' | 'ì' | 'î' | 'ï' => 'i',
            'Í' | 'Ì' | 'Î' | 'Ï' => 'I',
            'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
            'Ó' | 'Ò' | 'Ô' | 'Õ' | 'Ö' => 'O',
            'ú' | 'ù' | 'û' | 'ü' => 'u',
            'Ú' | 'Ù' | 'Û' | 'Ü' => 'U',
            'ç' => 'c',
            'Ç' => 'C',
            'ñ' => 'n',
            'Ñ' => 'N',
            other => other,
        })
        .collect()
}

/// Case- and accent-insensitive substring match on the name or the original codes.
/// `needle` must already be folded and lowercased.
fn matches_query(item: &Item, needle: &str) -> bool {
    let contains = |text: &str| fold_accents(text).to_lowercase().contains(needle);

    needle.is_empty()
        || contains(&item.nome)
        || item.codigos_originais.as_deref().is_some_and(contains)
}

/// Aggregate numbers for the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InventoryStats {
    pub items: usize,
    pub available_units: u64,
    pub in_use_units: u64,
    pub total_units: u64,
    pub low_stock: usize,
}

/// Owns the full item list fetched from the backend plus the derived view.
///
/// The view is a list of indices into `items`, recomputed whenever the query,
/// category or sort changes, so the list and the detail panel always show the
/// same `Item`.
#[derive(Debug, Default)]
pub struct InventoryList {
    items: Vec<Item>,
    view: Vec<usize>,
    query: String,
    category: CategoryFilter,
    sort: SortKey,
    selected: Option<i64>,
}

impl InventoryList {
    pub fn new(items: Vec<Item>) -> Self {
        let mut list = Self::default();
        list.replace_items(items);
        list
    }

    /// Swap in a fresh list from the server, keeping the selection when the
    /// item still exists
    pub fn replace_items(&mut self, items: Vec<Item>) {
        self.items = items;
        if let Some(id) = self.selected {
            if !self.items.iter().any(|item| item.id == id) {
                self.selected = None;
            }
        }
        self.refresh();
    }

    pub fn refresh(&mut self) {
        let needle = fold_accents(self.query.trim()).to_lowercase();
        let mut view: Vec<usize> = self
            .items
            .iter()
            .enumerate()
            .filter(|(_, item)| matches_query(item, &needle) && self.category.matches(item))
            .map(|(idx, _)| idx)
            .collect();

        self.sort.sort(&self.items, &mut view);
        self.view = view;
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
        self.refresh();
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn set_category(&mut self, category: CategoryFilter) {
        self.category = category;
        self.refresh();
    }

    pub fn category(&self) -> &CategoryFilter {
        &self.category
    }

    /// Step through `All` and then every known tab
    pub fn cycle_category(&mut self) {
        let tabs = self.categories();
        let next = match &self.category {
            CategoryFilter::All => tabs.into_iter().next().map(CategoryFilter::Tab),
            CategoryFilter::Tab(current) => tabs
                .iter()
                .position(|tab| tab == current)
                .and_then(|pos| tabs.get(pos + 1))
                .cloned()
                .map(CategoryFilter::Tab),
        };
        self.set_category(next.unwrap_or_default());
    }

    pub fn set_sort(&mut self, sort: SortKey) {
        self.sort = sort;
        self.refresh();
    }

    pub fn sort_key(&self) -> SortKey {
        self.sort
    }

    pub fn cycle_sort(&mut self) {
        self.set_sort(self.sort.next());
    }

    /// Distinct source tabs in the order they first appear
    pub fn categories(&self) -> Vec<String> {
        let mut tabs: Vec<String> = Vec::new();
        for item in &self.items {
            if let Some(tab) = item.aba_origem.as_deref().filter(|t| !t.is_empty()) {
                if !tabs.iter().any(|t| t == tab) {
                    tabs.push(tab.to_string());
                }
            }
        }
        tabs
    }

    pub fn all(&self) -> &[Item] {
        &self.items
    }

    pub fn visible(&self) -> impl Iterator<Item = &Item> {
        self.view.iter().map(move |&idx| &self.items[idx])
    }

    pub fn visible_len(&self) -> usize {
        self.view.len()
    }

    pub fn visible_at(&self, position: usize) -> Option<&Item> {
        self.view.get(position).map(|&idx| &self.items[idx])
    }

    pub fn is_empty_view(&self) -> bool {
        self.view.is_empty()
    }

    /// "1 item" / "N itens"
    pub fn count_label(&self) -> String {
        let count = self.view.len();
        format!("{} {}", count, if count == 1 { "item" } else { "itens" })
    }

    pub fn get(&self, id: i64) -> Option<&Item> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn select(&mut self, id: i64) -> Option<&Item> {
        let item = self.items.iter().find(|item| item.id == id)?;
        self.selected = Some(id);
        Some(item)
    }

    /// Insert or refresh a single item, e.g. one picked from the remote search
    pub fn upsert(&mut self, item: Item) {
        match self.items.iter_mut().find(|existing| existing.id == item.id) {
            Some(existing) => *existing = item,
            None => self.items.push(item),
        }
        self.refresh();
    }

    pub fn selected(&self) -> Option<&Item> {
        self.selected.and_then(|id| self.get(id))
    }

    pub fn selected_position(&self) -> Option<usize> {
        let id = self.selected?;
        self.view.iter().position(|&idx| self.items[idx].id == id)
    }

    /// Fold a confirmed transaction into the local copy.
    ///
    /// The available quantity is whatever the server says it is now. The
    /// in-use counter is only adjusted locally for display until the next reload.
    pub fn apply_transaction(
        &mut self,
        item_id: i64,
        kind: TransactionKind,
        quantity: u32,
        new_balance: i64,
    ) -> Option<&Item> {
        let item = self.items.iter_mut().find(|item| item.id == item_id)?;

        item.quantidade_disponivel = new_balance;
        let in_use = item.quantidade_em_uso.unwrap_or(0);
        let quantity = i64::from(quantity);
        item.quantidade_em_uso = Some(match kind {
            TransactionKind::Retirada => in_use.saturating_add(quantity),
            TransactionKind::Devolucao => in_use.saturating_sub(quantity).max(0),
        });

        // Sorting by availability may move the row
        self.refresh();
        self.get(item_id)
    }

    pub fn stats(&self) -> InventoryStats {
        self.items.iter().fold(
            InventoryStats {
                items: self.items.len(),
                ..Default::default()
            },
            |mut stats, item| {
                stats.available_units += non_negative(item.quantidade_disponivel);
                stats.in_use_units += non_negative(item.in_use());
                stats.total_units += non_negative(item.total_quantity());
                if item.is_low_stock() {
                    stats.low_stock += 1;
                }
                stats
            },
        )
    }
}

// Negative balances count as empty in the totals
fn non_negative(quantity: i64) -> u64 {
    u64::try_from(quantity).unwrap_or(0)
}

/// Icon for a source tab
pub fn category_icon(tab: &str) -> &'static str {
    match tab {
        "Mecânica" => "🔧",
        "Eletrônica" => "⚡",
        _ => "📦",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: i64, nome: &str, aba: Option<&str>, disponivel: i64, total: Option<i64>) -> Item {
        Item {
            id,
            nome: nome.to_string(),
            categoria: None,
            localizacao: None,
            aba_origem: aba.map(str::to_string),
            codigos_originais: None,
            quantidade_disponivel: disponivel,
            quantidade_em_uso: None,
            quantidade_total: total,
            estoque_minimo: None,
        }
    }

    fn sample() -> Vec<Item> {
        vec![
            item(1, "Parafusadeira", Some("Mecânica"), 2, Some(4)),
            item(2, "osciloscópio", Some("Eletrônica"), 5, Some(5)),
            item(3, "Alicate", Some("Mecânica"), 5, Some(10)),
            item(4, "Óculos de proteção", Some("Produto"), 0, Some(12)),
            item(5, "Multímetro", Some("Eletrônica"), 2, None),
        ]
    }

    fn names(list: &InventoryList) -> Vec<&str> {
        list.visible().map(|item| item.nome.as_str()).collect()
    }

    #[test]
    fn test_name_sort_ignores_case_and_accents() {
        let list = InventoryList::new(sample());
        assert_eq!(
            names(&list),
            vec!["Alicate", "Multímetro", "Óculos de proteção", "osciloscópio", "Parafusadeira"]
        );
    }

    #[test]
    fn test_available_sort_is_descending_and_stable() {
        let mut list = InventoryList::new(sample());
        list.set_sort(SortKey::Available);

        // 5s keep server order (2 before 3), 2s keep server order (1 before 5)
        let ids: Vec<i64> = list.visible().map(|item| item.id).collect();
        assert_eq!(ids, vec![2, 3, 1, 5, 4]);
    }

    #[test]
    fn test_total_sort_uses_fallback_total() {
        let mut list = InventoryList::new(sample());
        list.set_sort(SortKey::Total);

        let ids: Vec<i64> = list.visible().map(|item| item.id).collect();
        assert_eq!(ids, vec![4, 3, 2, 1, 5]);
    }

    #[test]
    fn test_query_matches_name_case_insensitively() {
        let mut list = InventoryList::new(sample());
        list.set_query("PARAF");
        assert_eq!(names(&list), vec!["Parafusadeira"]);
    }

    #[test]
    fn test_query_ignores_accents_both_ways() {
        let mut list = InventoryList::new(sample());
        list.set_query("oculos");
        assert_eq!(names(&list), vec!["Óculos de proteção"]);

        list.set_query("MULTÍ");
        assert_eq!(names(&list), vec!["Multímetro"]);
    }

    #[test]
    fn test_query_matches_original_codes() {
        let mut items = sample();
        items[2].codigos_originais = Some("MEC-001,MEC-002".into());
        let mut list = InventoryList::new(items);

        list.set_query("mec-002");
        assert_eq!(names(&list), vec!["Alicate"]);
    }

    #[test]
    fn test_category_all_returns_every_match() {
        let mut list = InventoryList::new(sample());
        list.set_query("o");
        let all = list.visible_len();

        list.set_category(CategoryFilter::All);
        assert_eq!(list.visible_len(), all);
        // osciloscópio, Óculos de proteção, Multímetro
        assert_eq!(all, 3);
    }

    #[test]
    fn test_category_tab_intersects_with_query() {
        let mut list = InventoryList::new(sample());
        list.set_category(CategoryFilter::Tab("Eletrônica".into()));
        assert!(list.visible().all(|item| item.aba_origem.as_deref() == Some("Eletrônica")));
        assert_eq!(list.visible_len(), 2);

        list.set_query("multi");
        assert_eq!(names(&list), vec!["Multímetro"]);
    }

    #[test]
    fn test_untagged_items_only_show_under_all() {
        let mut items = sample();
        items.push(item(6, "Trena", None, 1, None));
        let mut list = InventoryList::new(items);

        list.set_category(CategoryFilter::Tab("Produto".into()));
        assert_eq!(names(&list), vec!["Óculos de proteção"]);
    }

    #[test]
    fn test_empty_view_and_count_label() {
        let mut list = InventoryList::new(sample());
        list.set_query("xyz");
        assert!(list.is_empty_view());
        assert_eq!(list.count_label(), "0 itens");

        list.set_query("alic");
        assert_eq!(list.count_label(), "1 item");
    }

    #[test]
    fn test_categories_and_cycle() {
        let mut list = InventoryList::new(sample());
        assert_eq!(list.categories(), vec!["Mecânica", "Eletrônica", "Produto"]);

        list.cycle_category();
        assert_eq!(list.category(), &CategoryFilter::Tab("Mecânica".into()));
        list.cycle_category();
        list.cycle_category();
        assert_eq!(list.category(), &CategoryFilter::Tab("Produto".into()));
        list.cycle_category();
        assert_eq!(list.category(), &CategoryFilter::All);
    }

    #[test]
    fn test_apply_withdrawal_uses_server_balance() {
        let mut list = InventoryList::new(sample());
        list.select(3);

        // Server says 7 even though 5 - 2 would be 3
        let item = list
            .apply_transaction(3, TransactionKind::Retirada, 2, 7)
            .unwrap();
        assert_eq!(item.quantidade_disponivel, 7);
        assert_eq!(item.in_use(), 2);
        assert_eq!(list.selected().unwrap().quantidade_disponivel, 7);
    }

    #[test]
    fn test_apply_return_clamps_in_use_at_zero() {
        let mut list = InventoryList::new(sample());
        let item = list
            .apply_transaction(1, TransactionKind::Devolucao, 3, 5)
            .unwrap();
        assert_eq!(item.in_use(), 0);
        assert_eq!(item.quantidade_disponivel, 5);
    }

    #[test]
    fn test_apply_transaction_unknown_item() {
        let mut list = InventoryList::new(sample());
        assert!(list.apply_transaction(99, TransactionKind::Retirada, 1, 0).is_none());
    }

    #[test]
    fn test_replace_items_drops_stale_selection() {
        let mut list = InventoryList::new(sample());
        list.select(4);
        list.replace_items(sample().into_iter().filter(|item| item.id != 4).collect());
        assert!(list.selected().is_none());

        list.select(1);
        list.replace_items(sample());
        assert_eq!(list.selected().map(|item| item.id), Some(1));
    }

    #[test]
    fn test_selected_position_follows_view() {
        let mut list = InventoryList::new(sample());
        list.select(1);
        assert_eq!(list.selected_position(), Some(4));

        list.set_query("alicate");
        assert_eq!(list.selected_position(), None);
        assert!(list.selected().is_some());
    }

    #[test]
    fn test_stats() {
        let stats = InventoryList::new(sample()).stats();
        assert_eq!(stats.items, 5);
        assert_eq!(stats.available_units, 14);
        assert_eq!(stats.total_units, 4 + 5 + 10 + 12 + 2);
        // Only items at or under the minimum (default 0) count as low stock
        assert_eq!(stats.low_stock, 1);
    }

    #[test]
    fn test_stats_count_negative_balance_as_empty() {
        let mut items = sample();
        items.push(item(6, "Broca 8mm", Some("Mecânica"), -4, Some(2)));
        let stats = InventoryList::new(items).stats();

        assert_eq!(stats.available_units, 14);
        assert_eq!(stats.total_units, 4 + 5 + 10 + 12 + 2 + 2);
        assert_eq!(stats.low_stock, 2);
    }
}
